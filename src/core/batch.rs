use crate::core::generator::DocumentGenerator;
use crate::core::{EmployeeRecord, GeneratedDocument, RecordSource, Storage, TemplateSource};
use crate::utils::error::{DocGenError, Result};
use crate::utils::monitor::RunMonitor;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const REPORT_FILE_NAME: &str = "generation-report.json";

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Letters generated at the same time. Also bounds how many finished letters
    /// wait in memory for their turn to be written.
    pub concurrency: usize,
    /// Abort the batch at the first failing record instead of skipping it.
    pub stop_on_error: bool,
    pub clear_output: bool,
    pub write_report: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            stop_on_error: false,
            clear_output: false,
            write_report: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedRecord {
    /// 1-based position in the record stream.
    pub position: usize,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub generated: Vec<String>,
    pub failures: Vec<FailedRecord>,
    /// File names written more than once; the last record with the name wins.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overwritten: Vec<String>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.generated.len() + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

type Outcome = (usize, String, Result<GeneratedDocument>);

/// Runs the generator over a record stream and hands the letters to a storage.
pub struct BatchRunner<T: TemplateSource + 'static, S: Storage> {
    generator: Arc<DocumentGenerator<T>>,
    storage: S,
    options: BatchOptions,
    monitor: RunMonitor,
}

impl<T: TemplateSource + 'static, S: Storage> BatchRunner<T, S> {
    pub fn new(generator: DocumentGenerator<T>, storage: S, options: BatchOptions) -> Self {
        Self {
            generator: Arc::new(generator),
            storage,
            options,
            monitor: RunMonitor::new(false),
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = RunMonitor::new(enabled);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn run_source<R: RecordSource>(&self, source: &R) -> Result<BatchReport> {
        tracing::info!("Loading records...");
        let records = source.load_records().await?;
        tracing::info!("Loaded {} records", records.len());
        self.monitor.log_stats("Load records");
        self.run(records).await
    }

    pub async fn run(&self, records: Vec<EmployeeRecord>) -> Result<BatchReport> {
        let started_at = Local::now();

        if self.options.clear_output {
            tracing::info!("🧹 Clearing output before run");
            self.storage.clear_output().await?;
        }

        tracing::info!("Generating {} letters...", records.len());
        let window = self.options.concurrency.max(1);
        let mut pending: VecDeque<JoinHandle<Outcome>> = VecDeque::with_capacity(window);
        let mut queued = records.into_iter().enumerate();

        let mut generated = Vec::new();
        let mut failures = Vec::new();
        let mut overwritten = Vec::new();
        let mut written: HashSet<String> = HashSet::new();

        loop {
            // 視窗內最多 concurrency 筆同時產生，依記錄順序寫出
            while pending.len() < window {
                let Some((index, record)) = queued.next() else { break };
                pending.push_back(self.spawn_generation(index, record));
            }
            let Some(handle) = pending.pop_front() else { break };

            let (index, name, result) = handle.await.map_err(|e| DocGenError::ProcessingError {
                message: format!("generation task failed: {}", e),
            })?;

            match result {
                Ok(document) => {
                    self.storage
                        .write_file(document.file_name(), document.bytes())
                        .await?;
                    if !written.insert(document.file_name().to_string()) {
                        tracing::warn!(
                            "⚠️ Record {} ({}) overwrote {} written earlier in this run",
                            index + 1,
                            name,
                            document.file_name()
                        );
                        overwritten.push(document.file_name().to_string());
                    }
                    generated.push(document.file_name().to_string());
                }
                Err(e) if self.options.stop_on_error => {
                    tracing::error!("❌ Record {} ({}) failed, stopping: {}", index + 1, name, e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("⚠️ Skipping record {} ({}): {}", index + 1, name, e);
                    failures.push(FailedRecord {
                        position: index + 1,
                        name,
                        error: e.to_string(),
                    });
                }
            }
        }
        self.monitor.log_stats("Generate and write");

        let report = BatchReport {
            started_at,
            finished_at: Local::now(),
            generated,
            failures,
            overwritten,
        };

        if self.options.write_report {
            let json = serde_json::to_vec_pretty(&report)?;
            self.storage.write_file(REPORT_FILE_NAME, &json).await?;
        }

        tracing::info!(
            "Generated {} of {} letters ({} failed)",
            report.generated.len(),
            report.total(),
            report.failures.len()
        );
        self.monitor.log_final_stats(report.generated.len());
        Ok(report)
    }

    /// Generation is CPU-bound and synchronous, so it runs on the blocking pool.
    fn spawn_generation(&self, index: usize, record: EmployeeRecord) -> JoinHandle<Outcome> {
        let generator = Arc::clone(&self.generator);
        tokio::task::spawn_blocking(move || {
            let result = generator.generate(&record);
            (index, record.full_name(), result)
        })
    }
}
