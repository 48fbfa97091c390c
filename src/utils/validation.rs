use crate::utils::currency::SUPPORTED_LOCALES;
use crate::utils::error::{DocGenError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub const MAX_CONCURRENCY: usize = 64;

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(DocGenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DocGenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Checks `path` ends with one of `allowed_extensions` (case-insensitive).
pub fn validate_file_extension(field_name: &str, path: &str, allowed_extensions: &[&str]) -> Result<()> {
    validate_path(field_name, path)?;

    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension {
        Some(ext) if allowed_extensions.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(DocGenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                ext,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(DocGenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| DocGenError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DocGenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DocGenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_locale(field_name: &str, locale: &str) -> Result<()> {
    if SUPPORTED_LOCALES.contains(&locale) {
        return Ok(());
    }
    Err(DocGenError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: locale.to_string(),
        reason: format!("Unsupported locale. Supported: {}", SUPPORTED_LOCALES.join(", ")),
    })
}

/// Static field keys end up as content control names, so they must be usable as such.
pub fn validate_field_key(field_name: &str, key: &str) -> Result<()> {
    validate_non_empty_string(field_name, key)?;
    if key.chars().any(|ch| ch.is_control()) {
        return Err(DocGenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: key.to_string(),
            reason: "Field key contains control characters".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output.path", "./output").is_ok());
        assert!(validate_path("output.path", "").is_err());
        assert!(validate_path("output.path", "   ").is_err());
        assert!(validate_path("output.path", "out\0put").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("template.path", "letters/raise.docx", &["docx"]).is_ok());
        assert!(validate_file_extension("template.path", "RAISE.DOCX", &["docx"]).is_ok());
        assert!(validate_file_extension("template.path", "raise.doc", &["docx"]).is_err());
        assert!(validate_file_extension("records.path", "records", &["csv"]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("batch.concurrency", 4, 1, MAX_CONCURRENCY).is_ok());
        assert!(validate_range("batch.concurrency", 0, 1, MAX_CONCURRENCY).is_err());
        assert!(validate_range("batch.concurrency", 65, 1, MAX_CONCURRENCY).is_err());
    }

    #[test]
    fn test_validate_locale() {
        assert!(validate_locale("formatting.locale", "en-US").is_ok());
        assert!(validate_locale("formatting.locale", "en_US").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some(3);
        assert_eq!(*validate_required_field("x", &present).unwrap(), 3);
        let missing: Option<u32> = None;
        assert!(matches!(
            validate_required_field("x", &missing),
            Err(DocGenError::MissingConfigError { .. })
        ));
    }
}
