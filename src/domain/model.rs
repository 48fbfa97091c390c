use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the records file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub first_name: String,
    pub last_name: String,
    pub salary_raise: Decimal,
}

impl EmployeeRecord {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, salary_raise: Decimal) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            salary_raise,
        }
    }

    /// "First Last", skipping whichever part is blank.
    pub fn full_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A finished letter, ready for the output sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    bytes: Vec<u8>,
    file_name: String,
}

impl GeneratedDocument {
    pub const MIME_TYPE: &'static str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
    pub const EXTENSION: &'static str = "docx";

    pub(crate) fn new(bytes: Vec<u8>, file_name: String) -> Self {
        Self { bytes, file_name }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &'static str {
        Self::MIME_TYPE
    }

    pub fn extension(&self) -> &'static str {
        Self::EXTENSION
    }
}
