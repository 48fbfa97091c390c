// Adapters layer: concrete implementations of the domain ports (records, templates, output).

pub mod csv_source;
pub mod storage;
pub mod template;
