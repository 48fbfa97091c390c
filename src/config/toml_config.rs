use crate::core::ConfigProvider;
use crate::utils::currency::CurrencyFormat;
use crate::utils::error::{DocGenError, Result};
use crate::utils::validation::{self, Validate, MAX_CONCURRENCY};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Locale value that switches to `[formatting.currency]`.
pub const CUSTOM_LOCALE: &str = "custom";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub template: TemplateConfig,
    pub records: RecordsConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub formatting: FormattingConfig,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub batch: BatchConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub clear_before_run: Option<bool>,
    pub write_report: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattingConfig {
    pub locale: String,
    /// Used when `locale = "custom"`.
    pub currency: Option<CurrencyFormat>,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            currency: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    pub concurrency: Option<usize>,
    pub stop_on_error: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DocGenError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_file_extension("template.path", &self.template.path, &["docx"])?;
        validation::validate_file_extension("records.path", &self.records.path, &["csv"])?;
        validation::validate_path("output.path", &self.output.path)?;

        if self.formatting.locale == CUSTOM_LOCALE {
            validation::validate_required_field("formatting.currency", &self.formatting.currency)?;
        } else {
            validation::validate_locale("formatting.locale", &self.formatting.locale)?;
        }

        validation::validate_range("batch.concurrency", self.concurrency(), 1, MAX_CONCURRENCY)?;
        for key in self.fields.keys() {
            validation::validate_field_key("fields", key)?;
        }
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn template_path(&self) -> &str {
        &self.template.path
    }

    fn records_path(&self) -> &str {
        &self.records.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn concurrency(&self) -> usize {
        self.batch.concurrency.unwrap_or(4)
    }

    fn stop_on_error(&self) -> bool {
        self.batch.stop_on_error.unwrap_or(false)
    }

    fn clear_output(&self) -> bool {
        self.output.clear_before_run.unwrap_or(false)
    }

    fn write_report(&self) -> bool {
        self.output.write_report.unwrap_or(false)
    }

    fn currency_format(&self) -> Result<CurrencyFormat> {
        if self.formatting.locale == CUSTOM_LOCALE {
            return validation::validate_required_field("formatting.currency", &self.formatting.currency).cloned();
        }
        CurrencyFormat::for_locale(&self.formatting.locale).ok_or_else(|| DocGenError::InvalidConfigValueError {
            field: "formatting.locale".to_string(),
            value: self.formatting.locale.clone(),
            reason: "Unsupported locale".to_string(),
        })
    }

    fn static_fields(&self) -> BTreeMap<String, String> {
        self.fields.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[template]
path = "raise.docx"

[records]
path = "records.csv"

[output]
path = "./letters"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.concurrency(), 4);
        assert!(!config.stop_on_error());
        assert!(!config.clear_output());
        assert!(!config.monitoring_enabled());
        assert_eq!(config.currency_format().unwrap(), CurrencyFormat::default());
        assert!(config.static_fields().is_empty());
    }

    #[test]
    fn test_unset_env_var_is_left_verbatim() {
        let content = "value = \"${LETTER_MERGE_SURELY_UNSET_VAR}\"";
        assert_eq!(TomlConfig::substitute_env_vars(content), content);
    }

    #[test]
    fn test_custom_locale_requires_currency_table() {
        let content = format!("{}\n[formatting]\nlocale = \"custom\"\n", MINIMAL);
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(DocGenError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = TomlConfig::from_toml_str("[template\npath = 1").unwrap_err();
        assert!(matches!(err, DocGenError::ConfigValidationError { .. }));
    }
}
