use crate::core::merger::DocumentMerger;
use crate::core::resolver::FieldResolver;
use crate::core::{EmployeeRecord, GeneratedDocument, TemplateSource};
use crate::utils::error::{DocGenError, Result};
use chrono::{Local, NaiveDate};

/// Turns one record into one letter.
///
/// Nothing is shared between calls except the read-only template source, so a
/// generator can be used from several threads at once.
pub struct DocumentGenerator<T: TemplateSource> {
    template: T,
    merger: DocumentMerger,
    resolver: FieldResolver,
}

impl<T: TemplateSource> DocumentGenerator<T> {
    pub fn new(template: T, resolver: FieldResolver) -> Self {
        Self {
            template,
            merger: DocumentMerger::new(),
            resolver,
        }
    }

    pub fn resolver(&self) -> &FieldResolver {
        &self.resolver
    }

    pub fn generate(&self, record: &EmployeeRecord) -> Result<GeneratedDocument> {
        self.generate_on(record, Local::now().date_naive())
    }

    /// Same as [`generate`](Self::generate) with the date used in the file name fixed.
    pub fn generate_on(&self, record: &EmployeeRecord, date: NaiveDate) -> Result<GeneratedDocument> {
        // 每筆記錄都重新讀取範本，避免記錄之間互相影響
        let template = self.template.load()?;
        let keys = self.merger.placeholder_keys(&template)?;
        tracing::debug!("Template placeholders: {:?}", keys);

        let mapping = self
            .resolver
            .resolve_all(keys.iter().map(String::as_str), record)?;
        let bytes = self.merger.merge(&template, &mapping)?;

        let file_name = output_file_name(record, date);
        tracing::info!("📄 Generated {} ({} bytes)", file_name, bytes.len());
        Ok(GeneratedDocument::new(bytes, file_name))
    }

    /// Loads the template and checks every placeholder in it can be resolved.
    /// Returns the placeholder keys in order of first appearance.
    pub fn check_template(&self) -> Result<Vec<String>> {
        let template = self.template.load()?;
        let keys = self.merger.placeholder_keys(&template)?;
        if let Some(unknown) = keys.iter().find(|key| !self.resolver.recognizes(key)) {
            return Err(DocGenError::UnknownPlaceholder { key: unknown.clone() });
        }
        Ok(keys)
    }
}

/// `"{full name}-{YYYY-MM-DD}.docx"`, with characters that are not allowed in file
/// names replaced by `_`.
pub fn output_file_name(record: &EmployeeRecord, date: NaiveDate) -> String {
    format!(
        "{}-{}.{}",
        sanitize_file_stem(&record.full_name()),
        date.format("%Y-%m-%d"),
        GeneratedDocument::EXTENSION
    )
}

fn sanitize_file_stem(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect();
    let cleaned = cleaned.trim_matches(|ch: char| ch == '.' || ch.is_whitespace());
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned.to_string()
    }
}
