pub mod batch;
pub mod generator;
pub mod merger;
pub mod region;
pub mod replacer;
pub mod resolver;
pub mod xml;

pub use crate::domain::model::{EmployeeRecord, GeneratedDocument};
pub use crate::domain::ports::{ConfigProvider, RecordSource, Storage, TemplateSource};
pub use crate::utils::error::Result;
