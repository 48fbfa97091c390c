use crate::core::TemplateSource;
use crate::utils::error::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Template read from disk on every `load`.
#[derive(Debug, Clone)]
pub struct FileTemplate {
    path: PathBuf,
}

impl FileTemplate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TemplateSource for FileTemplate {
    fn load(&self) -> Result<Vec<u8>> {
        tracing::debug!("Reading template {}", self.path.display());
        Ok(std::fs::read(&self.path)?)
    }
}

/// Template kept in memory; `load` hands out a copy of the shared buffer.
#[derive(Debug, Clone)]
pub struct InMemoryTemplate {
    bytes: Arc<[u8]>,
}

impl InMemoryTemplate {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self { bytes: bytes.into() }
    }
}

impl TemplateSource for InMemoryTemplate {
    fn load(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.to_vec())
    }
}
