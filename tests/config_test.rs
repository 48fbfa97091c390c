use anyhow::Result;
use letter_merge::core::ConfigProvider;
use letter_merge::utils::validation::Validate;
use letter_merge::TomlConfig;
use tempfile::TempDir;

#[test]
fn test_load_config_file_with_env_substitution() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("letters.toml");
    std::fs::write(
        &config_path,
        r#"
[template]
path = "templates/raise.docx"

[records]
path = "data/raises.csv"

[output]
path = "${LETTER_MERGE_TEST_OUTPUT_DIR}/letters"
write_report = true

[formatting]
locale = "de-DE"

[fields]
CompanyName = "Acme Corp"

[batch]
concurrency = 8
stop_on_error = true

[monitoring]
enabled = true
"#,
    )?;
    std::env::set_var("LETTER_MERGE_TEST_OUTPUT_DIR", "/srv/out");

    let config = TomlConfig::from_file(&config_path)?;
    config.validate()?;

    assert_eq!(config.output_path(), "/srv/out/letters");
    assert_eq!(config.concurrency(), 8);
    assert!(config.stop_on_error());
    assert!(config.write_report());
    assert!(!config.clear_output());
    assert!(config.monitoring_enabled());
    assert_eq!(
        config.static_fields().get("CompanyName").map(String::as_str),
        Some("Acme Corp")
    );
    assert_eq!(config.currency_format()?.symbol, "€");
    Ok(())
}

#[test]
fn test_missing_config_file_is_io_error() {
    let err = TomlConfig::from_file("/nonexistent/letters.toml").unwrap_err();
    assert!(matches!(err, letter_merge::DocGenError::IoError(_)));
}
