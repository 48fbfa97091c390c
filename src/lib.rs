pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{
    csv_source::CsvRecordSource,
    storage::LocalStorage,
    template::{FileTemplate, InMemoryTemplate},
};
pub use core::{
    batch::{BatchOptions, BatchReport, BatchRunner},
    generator::DocumentGenerator,
    merger::{DocumentMerger, ReplacerMapping},
    region::PlaceholderRegion,
    replacer::ContentReplacer,
    resolver::{FieldResolver, PlaceholderKey},
};
pub use domain::model::{EmployeeRecord, GeneratedDocument};
pub use utils::error::{DocGenError, Result};
