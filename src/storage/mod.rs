//! Snapshot storage abstractions.
//!
//! A snapshot store is a durable string-keyed map holding the last committed
//! canonical JSON text per topic. It knows nothing about schemas.
//!
//! ## Layout (local backend)
//!
//! ```text
//! storage/
//! ├── class_list.json
//! ├── teachers.json
//! └── ...
//! ```

pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{StorageBackend, StorageConfig};

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Fails with [`AppError::NotFound`] when the key is absent.
    async fn get(&self, key: &str) -> Result<String>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Read the value stored under `key`, mapping "not found" to `None`.
    async fn get_optional(&self, key: &str) -> Result<Option<String>> {
        match self.get(key).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Build the snapshot store selected by the configuration.
pub async fn open(config: &StorageConfig) -> Result<Arc<dyn SnapshotStore>> {
    match config.backend {
        StorageBackend::Local => {
            log::debug!("Using local snapshot storage at {}", config.dir.display());
            Ok(Arc::new(LocalStorage::new(&config.dir)))
        }
        StorageBackend::Memory => {
            log::warn!("Using in-memory snapshot storage; baselines are lost on exit");
            Ok(Arc::new(MemoryStorage::new()))
        }
        #[cfg(feature = "s3")]
        StorageBackend::S3 => {
            let storage = s3::S3Storage::from_config(config).await?;
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "s3"))]
        StorageBackend::S3 => Err(crate::error::AppError::config(
            "storage.backend = \"s3\" requires the `s3` feature",
        )),
    }
}
