use crate::core::merger::ReplacerMapping;
use crate::core::replacer::ContentReplacer;
use crate::domain::model::EmployeeRecord;
use crate::utils::currency::CurrencyFormat;
use crate::utils::error::{DocGenError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Placeholders the generator knows how to fill from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKey {
    EmployeeName,
    SalaryRaise,
}

impl PlaceholderKey {
    pub const ALL: [PlaceholderKey; 2] = [PlaceholderKey::EmployeeName, PlaceholderKey::SalaryRaise];

    pub fn as_str(self) -> &'static str {
        match self {
            PlaceholderKey::EmployeeName => "EmployeeName",
            PlaceholderKey::SalaryRaise => "SalaryRaise",
        }
    }

    pub fn resolve(self, record: &EmployeeRecord, currency: &CurrencyFormat) -> ContentReplacer {
        match self {
            PlaceholderKey::EmployeeName => ContentReplacer::single_line(record.full_name()),
            PlaceholderKey::SalaryRaise => ContentReplacer::single_line(currency.format(record.salary_raise)),
        }
    }
}

impl FromStr for PlaceholderKey {
    type Err = DocGenError;

    fn from_str(s: &str) -> Result<Self> {
        PlaceholderKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| DocGenError::UnknownPlaceholder { key: s.to_string() })
    }
}

impl fmt::Display for PlaceholderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps placeholder keys to replacers for a given record.
///
/// Built-in keys come from [`PlaceholderKey`]; configured static fields add keys
/// whose value is the same for every record.
#[derive(Debug, Clone, Default)]
pub struct FieldResolver {
    currency: CurrencyFormat,
    static_fields: BTreeMap<String, String>,
}

impl FieldResolver {
    pub fn new(currency: CurrencyFormat) -> Self {
        Self {
            currency,
            static_fields: BTreeMap::new(),
        }
    }

    pub fn with_static_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        for key in fields.keys() {
            if key.parse::<PlaceholderKey>().is_ok() {
                tracing::warn!("Static field '{}' is shadowed by the built-in field", key);
            }
        }
        self.static_fields = fields;
        self
    }

    pub fn currency(&self) -> &CurrencyFormat {
        &self.currency
    }

    pub fn recognizes(&self, key: &str) -> bool {
        key.parse::<PlaceholderKey>().is_ok() || self.static_fields.contains_key(key)
    }

    pub fn recognized_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = PlaceholderKey::ALL.iter().map(|key| key.to_string()).collect();
        let extra: Vec<String> = self
            .static_fields
            .keys()
            .filter(|key| !keys.contains(*key))
            .cloned()
            .collect();
        keys.extend(extra);
        keys
    }

    pub fn resolve(&self, key: &str, record: &EmployeeRecord) -> Result<ContentReplacer> {
        if let Ok(known) = key.parse::<PlaceholderKey>() {
            return Ok(known.resolve(record, &self.currency));
        }
        if let Some(value) = self.static_fields.get(key) {
            return Ok(ContentReplacer::single_line(value.clone()));
        }
        Err(DocGenError::UnknownPlaceholder { key: key.to_string() })
    }

    /// Resolves every key, stopping at the first one that is not recognized.
    pub fn resolve_all<'a, I>(&self, keys: I, record: &EmployeeRecord) -> Result<ReplacerMapping>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut mapping = ReplacerMapping::new();
        for key in keys {
            mapping.insert(key, self.resolve(key, record)?);
        }
        Ok(mapping)
    }
}
