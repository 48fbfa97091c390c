use crate::core::Storage;
use crate::utils::error::Result;
use std::path::Path;

/// Writes documents under a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        tracing::debug!("Wrote {} ({} bytes)", full_path.display(), data.len());
        Ok(())
    }

    /// Removes the files directly under the base directory; sub-directories stay.
    async fn clear_output(&self) -> Result<()> {
        let base = Path::new(&self.base_path);
        if !tokio::fs::try_exists(base).await? {
            return Ok(());
        }

        let mut entries = tokio::fs::read_dir(base).await?;
        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }
        tracing::info!("Removed {} files from {}", removed, self.base_path);
        Ok(())
    }
}
