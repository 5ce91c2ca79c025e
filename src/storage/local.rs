//! Local filesystem snapshot storage.
//!
//! Each key is one file, `{root}/{key}.json`, holding canonical JSON text.
//! Writes go to a uniquely named temp file in the same directory and are
//! renamed into place, so a reader sees either the previous snapshot or the
//! new one, never a partial file, and concurrent writers never share a temp.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use crate::error::{AppError, Result};
use crate::storage::SnapshotStore;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a key, rejecting keys that escape the root.
    fn path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(AppError::validation(format!(
                "invalid storage key '{}'",
                key
            )));
        }
        Ok(self.root_dir.join(format!("{}.json", key)))
    }

    /// Write bytes atomically (write to a fresh temp, then rename).
    async fn write_bytes(&self, path: PathBuf, bytes: Vec<u8>) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let root = self.root_dir.clone();
        tokio::task::spawn_blocking(move || persist(&root, &path, &bytes))
            .await
            .map_err(|e| AppError::Io(std::io::Error::other(e)))?
    }
}

fn persist(root: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = NamedTempFile::new_in(root)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| AppError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl SnapshotStore for LocalStorage {
    async fn get(&self, key: &str) -> Result<String> {
        let path = self.path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::not_found(key)),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key)?;
        log::debug!("Writing {} bytes to {}", value.len(), path.display());
        self.write_bytes(path, value.as_bytes().to_vec()).await
    }
}
