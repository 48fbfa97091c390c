use crate::domain::model::EmployeeRecord;
use crate::utils::currency::CurrencyFormat;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Output sink for generated documents.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Empties the destination before a run.
    fn clear_output(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Supplies the template package. Every call hands out a fresh copy.
pub trait TemplateSource: Send + Sync {
    fn load(&self) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn load_records(&self) -> Result<Vec<EmployeeRecord>>;
}

pub trait ConfigProvider: Send + Sync {
    fn template_path(&self) -> &str;
    fn records_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn concurrency(&self) -> usize;
    fn stop_on_error(&self) -> bool;
    fn clear_output(&self) -> bool;
    fn write_report(&self) -> bool;
    fn currency_format(&self) -> Result<CurrencyFormat>;
    fn static_fields(&self) -> BTreeMap<String, String>;
}
