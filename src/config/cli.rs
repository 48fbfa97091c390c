use crate::core::ConfigProvider;
use crate::utils::currency::CurrencyFormat;
use crate::utils::error::{DocGenError, Result};
use crate::utils::validation::{self, Validate, MAX_CONCURRENCY};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "letter-merge")]
#[command(about = "Generate one personalized letter per record from a .docx template")]
pub struct CliConfig {
    /// Template document (.docx) with content controls
    #[arg(long, default_value = "template.docx")]
    pub template: String,

    /// Records file (.csv) with first_name,last_name,salary_raise columns
    #[arg(long, default_value = "records.csv")]
    pub records: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Currency formatting locale
    #[arg(long, default_value = "en-US")]
    pub locale: String,

    #[arg(long, default_value = "4")]
    pub concurrency: usize,

    #[arg(long, help = "Stop at the first record that fails")]
    pub stop_on_error: bool,

    #[arg(long, help = "Delete the files in the output directory before generating")]
    pub clear_output: bool,

    #[arg(long, help = "Write generation-report.json next to the letters")]
    pub report: bool,

    /// Extra constant field, KEY=VALUE (repeatable)
    #[arg(long = "field", value_parser = parse_key_value)]
    pub fields: Vec<(String, String)>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    /// TOML configuration file; replaces the generation flags above
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, help = "Check template and records without writing anything")]
    pub dry_run: bool,
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_file_extension("template", &self.template, &["docx"])?;
        validation::validate_file_extension("records", &self.records, &["csv"])?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_locale("locale", &self.locale)?;
        validation::validate_range("concurrency", self.concurrency, 1, MAX_CONCURRENCY)?;
        for (key, _) in &self.fields {
            validation::validate_field_key("field", key)?;
        }
        Ok(())
    }
}

impl ConfigProvider for CliConfig {
    fn template_path(&self) -> &str {
        &self.template
    }

    fn records_path(&self) -> &str {
        &self.records
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn stop_on_error(&self) -> bool {
        self.stop_on_error
    }

    fn clear_output(&self) -> bool {
        self.clear_output
    }

    fn write_report(&self) -> bool {
        self.report
    }

    fn currency_format(&self) -> Result<CurrencyFormat> {
        CurrencyFormat::for_locale(&self.locale).ok_or_else(|| DocGenError::InvalidConfigValueError {
            field: "locale".to_string(),
            value: self.locale.clone(),
            reason: "Unsupported locale".to_string(),
        })
    }

    fn static_fields(&self) -> BTreeMap<String, String> {
        self.fields.iter().cloned().collect()
    }
}
