use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use super::StorageError;

/// Flat directory of plain-text files. Writes overwrite existing files.
#[derive(Debug, Clone)]
pub struct TextFileStorage {
    root: PathBuf,
}

impl TextFileStorage {
    /// Creates the root directory (and any missing parents) if needed.
    pub async fn create(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        debug!("Text file storage ready at {}", root.display());
        Ok(Self { root })
    }

    /// Writes `content` to `file_name` directly under the root and returns the full path.
    pub async fn write_text(&self, file_name: &str, content: &str) -> Result<PathBuf, StorageError> {
        if file_name.is_empty()
            || file_name == "."
            || file_name == ".."
            || file_name.contains(['/', '\\'])
        {
            return Err(StorageError::InvalidName(file_name.to_string()));
        }

        let path = self.root.join(file_name);
        fs::write(&path, content.as_bytes()).await?;
        debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(path)
    }
}
