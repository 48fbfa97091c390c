use clap::Parser;
use letter_merge::core::{ConfigProvider, RecordSource};
use letter_merge::utils::error::ErrorSeverity;
use letter_merge::utils::{logger, validation::Validate};
use letter_merge::{
    BatchOptions, BatchRunner, CliConfig, CsvRecordSource, DocGenError, DocumentGenerator, FieldResolver,
    FileTemplate, LocalStorage, TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting letter-merge");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let outcome = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => {
                    let monitor = cli.monitor || config.monitoring_enabled();
                    run(&config, monitor, cli.dry_run).await
                }
                Err(e) => Err(e),
            }
        }
        None => run(&cli, cli.monitor, cli.dry_run).await,
    };

    match outcome {
        Ok(true) => Ok(()),
        Ok(false) => {
            // 部分記錄失敗
            std::process::exit(2);
        }
        Err(e) => {
            tracing::error!(
                "❌ Generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

/// Returns whether every record produced a letter.
async fn run<C: ConfigProvider + Validate>(config: &C, monitor: bool, dry_run: bool) -> Result<bool, DocGenError> {
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }
    tracing::info!("✅ Configuration validated");

    let resolver = FieldResolver::new(config.currency_format()?).with_static_fields(config.static_fields());
    let generator = DocumentGenerator::new(FileTemplate::new(config.template_path()), resolver);
    let source = CsvRecordSource::new(config.records_path());

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        return perform_dry_run(&generator, &source).await;
    }

    let options = BatchOptions {
        concurrency: config.concurrency(),
        stop_on_error: config.stop_on_error(),
        clear_output: config.clear_output(),
        write_report: config.write_report(),
    };
    let storage = LocalStorage::new(config.output_path().to_string());
    let runner = BatchRunner::new(generator, storage, options).with_monitoring(monitor);

    let report = runner.run_source(&source).await?;

    println!(
        "✅ Generated {} of {} letters",
        report.generated.len(),
        report.total()
    );
    println!("📁 Output saved to: {}", config.output_path());
    for name in &report.overwritten {
        eprintln!("⚠️ {} was written by more than one record", name);
    }
    for failure in &report.failures {
        eprintln!("⚠️ Record {} ({}): {}", failure.position, failure.name, failure.error);
    }

    Ok(report.is_success())
}

async fn perform_dry_run(
    generator: &DocumentGenerator<FileTemplate>,
    source: &CsvRecordSource,
) -> Result<bool, DocGenError> {
    let keys = generator.check_template()?;
    println!("📄 Template placeholders: {}", keys.join(", "));

    let records = source.load_records().await?;
    println!("👥 Records: {}", records.len());
    for record in records.iter().take(5) {
        println!("   - {}", record.full_name());
    }
    if records.len() > 5 {
        println!("   ... and {} more", records.len() - 5);
    }
    Ok(true)
}
