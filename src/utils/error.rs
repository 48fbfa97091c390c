use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocGenError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("XML processing failed: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Malformed template part '{part}': {reason}")]
    MalformedTemplate { part: String, reason: String },

    #[error("Placeholder '{key}' has no text to replace")]
    EmptyRegion { key: String },

    #[error("Template references unknown placeholder '{key}'")]
    UnknownPlaceholder { key: String },

    #[error("Invalid record at row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, DocGenError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Template,
    Mapping,
    Input,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DocGenError {
    pub fn malformed(part: impl Into<String>, reason: impl Into<String>) -> Self {
        DocGenError::MalformedTemplate {
            part: part.into(),
            reason: reason.into(),
        }
    }

    /// `EmptyRegion` is the replacer-side flavour of a malformed template.
    pub fn is_malformed_template(&self) -> bool {
        matches!(
            self,
            DocGenError::MalformedTemplate { .. } | DocGenError::EmptyRegion { .. }
        )
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DocGenError::ZipError(_)
            | DocGenError::XmlError(_)
            | DocGenError::MalformedTemplate { .. }
            | DocGenError::EmptyRegion { .. } => ErrorCategory::Template,
            DocGenError::UnknownPlaceholder { .. } => ErrorCategory::Mapping,
            DocGenError::CsvError(_) | DocGenError::InvalidRecord { .. } => ErrorCategory::Input,
            DocGenError::ConfigError { .. }
            | DocGenError::ConfigValidationError { .. }
            | DocGenError::InvalidConfigValueError { .. }
            | DocGenError::MissingConfigError { .. } => ErrorCategory::Configuration,
            DocGenError::IoError(_)
            | DocGenError::SerializationError(_)
            | DocGenError::ProcessingError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Template | ErrorCategory::Mapping => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DocGenError::ZipError(_) => "Make sure the template is a .docx package and not a legacy .doc file",
            DocGenError::XmlError(_) | DocGenError::MalformedTemplate { .. } => {
                "Re-save the template in a word processor and check every content control has a title or tag"
            }
            DocGenError::EmptyRegion { .. } => {
                "Give the content control some placeholder text in the template"
            }
            DocGenError::UnknownPlaceholder { .. } => {
                "Rename the content control or declare it under [fields] in the configuration"
            }
            DocGenError::CsvError(_) | DocGenError::InvalidRecord { .. } => {
                "Check the records file has first_name,last_name,salary_raise columns"
            }
            DocGenError::ConfigError { .. }
            | DocGenError::ConfigValidationError { .. }
            | DocGenError::InvalidConfigValueError { .. }
            | DocGenError::MissingConfigError { .. } => "Review the command-line flags or the TOML configuration file",
            DocGenError::IoError(_) => "Check the paths exist and are readable/writable",
            DocGenError::SerializationError(_) | DocGenError::ProcessingError { .. } => {
                "Re-run with --verbose and inspect the log"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Template => format!("The template could not be used: {}", self),
            ErrorCategory::Mapping => format!("The template and the known fields do not match: {}", self),
            ErrorCategory::Input => format!("The records could not be read: {}", self),
            ErrorCategory::Configuration => format!("The configuration is invalid: {}", self),
            ErrorCategory::System => format!("An unexpected error occurred: {}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_region_is_malformed_template() {
        let err = DocGenError::EmptyRegion {
            key: "EmployeeName".to_string(),
        };
        assert!(err.is_malformed_template());
        assert_eq!(err.category(), ErrorCategory::Template);

        let err = DocGenError::UnknownPlaceholder {
            key: "Bonus".to_string(),
        };
        assert!(!err.is_malformed_template());
        assert_eq!(err.category(), ErrorCategory::Mapping);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_user_friendly_message_contains_cause() {
        let err = DocGenError::malformed("word/document.xml", "content control without a key");
        let message = err.user_friendly_message();
        assert!(message.contains("word/document.xml"));
        assert!(message.contains("content control without a key"));
    }
}
