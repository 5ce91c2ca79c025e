//! Fetched topic payloads.
//!
//! The scrapers run outside this crate and leave one JSON document per topic.
//! A failed fetch is reported as `None`, the absence marker the engine turns
//! into `NoUpdate`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::models::Topic;

/// Source of freshly fetched topic values.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the current value of a topic, or `None` if fetching failed.
    async fn fetch(&self, topic: Topic) -> Option<Value>;
}

/// Reads `{dir}/{topic}.json`, or one explicit file for every topic.
#[derive(Debug, Clone)]
pub struct JsonFileFetcher {
    source: Source,
}

#[derive(Debug, Clone)]
enum Source {
    Dir(PathBuf),
    File(PathBuf),
}

impl JsonFileFetcher {
    /// Fetch each topic from its own file under `dir`.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::Dir(dir.into()),
        }
    }

    /// Fetch from a single file regardless of topic.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File(path.into()),
        }
    }

    /// Path read for the given topic.
    pub fn path_for(&self, topic: Topic) -> PathBuf {
        match &self.source {
            Source::Dir(dir) => dir.join(format!("{}.json", topic)),
            Source::File(path) => path.clone(),
        }
    }

    async fn read(path: &Path) -> crate::error::Result<Value> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl Fetcher for JsonFileFetcher {
    async fn fetch(&self, topic: Topic) -> Option<Value> {
        let path = self.path_for(topic);
        match Self::read(&path).await {
            Ok(value) => {
                log::debug!("Fetched {} from {}", topic, path.display());
                Some(value)
            }
            Err(e) => {
                log::warn!("Failed to fetch {} from {}: {}", topic, path.display(), e);
                None
            }
        }
    }
}
