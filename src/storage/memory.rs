//! In-memory snapshot storage.
//!
//! Used by tests and by the `memory` backend for throwaway runs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::storage::SnapshotStore;

/// Snapshot store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `(key, value)` pairs.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Whether any value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SnapshotStore for MemoryStorage {
    async fn get(&self, key: &str) -> Result<String> {
        self.lock()
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::not_found(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing() {
        let store = MemoryStorage::new();
        let err = store.get("non-existent").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryStorage::new();
        store.set("setkey", r#"["value"]"#).await.unwrap();
        assert_eq!(store.get("setkey").await.unwrap(), r#"["value"]"#);

        store.set("setkey", r#"["new","value"]"#).await.unwrap();
        assert_eq!(store.get("setkey").await.unwrap(), r#"["new","value"]"#);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_with_entries() {
        let store = MemoryStorage::with_entries([("getkey", r#"["value"]"#)]);
        assert!(store.contains("getkey"));
        assert_eq!(store.get("getkey").await.unwrap(), r#"["value"]"#);
    }
}
