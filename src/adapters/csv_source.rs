use crate::core::{EmployeeRecord, RecordSource};
use crate::utils::error::{DocGenError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "FirstName")]
    first_name: String,
    #[serde(alias = "LastName")]
    last_name: String,
    #[serde(alias = "SalaryRaise")]
    salary_raise: String,
}

/// Records from a CSV file with a header row.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse<R: Read>(reader: R) -> Result<Vec<EmployeeRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for (index, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
            // 第 1 行是標題
            let line = index + 2;
            let row = row?;
            let salary_raise = parse_amount(&row.salary_raise).map_err(|reason| DocGenError::InvalidRecord {
                row: line,
                reason,
            })?;
            records.push(EmployeeRecord::new(row.first_name, row.last_name, salary_raise));
        }
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for CsvRecordSource {
    async fn load_records(&self) -> Result<Vec<EmployeeRecord>> {
        tracing::debug!("Reading records from {}", self.path.display());
        let data = tokio::fs::read(&self.path).await?;
        Self::parse(data.as_slice())
    }
}

/// Accepts plain decimals as well as "$1,234.50"-style decorated amounts.
fn parse_amount(raw: &str) -> std::result::Result<Decimal, String> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | '_') && !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Err("salary_raise is empty".to_string());
    }
    Decimal::from_str(&cleaned).map_err(|e| format!("salary_raise '{}' is not a number: {}", raw, e))
}
