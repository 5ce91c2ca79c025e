// src/pipeline/engine.rs

//! Snapshot reconciliation engine.
//!
//! Every `diff_*` function exchanges the topic's stored baseline for the
//! freshly fetched value, then diffs the fetched value against the old
//! baseline with the topic's [`DiffStrategy`]. The returned string is the
//! canonical JSON diff document; only the full new value is ever persisted.

use std::sync::Arc;

use serde_json::Value;

use crate::encoding;
use crate::error::{AppError, Result};
use crate::models::Topic;
use crate::pipeline::diff::DiffStrategy;
use crate::storage::SnapshotStore;

/// Reconciles fetched topic snapshots against the stored baselines.
#[derive(Clone)]
pub struct DiffEngine {
    store: Arc<dyn SnapshotStore>,
}

impl DiffEngine {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Replace the value stored under `key` with `new`, returning the old one.
    ///
    /// `new = None` means the fetch failed. Returns `Ok(None)` when nothing
    /// was recorded before, which is distinct from a stored `null`.
    ///
    /// # Errors
    ///
    /// [`AppError::NoUpdate`] when `new` is `None` or deep-equal to the stored
    /// value. The store is not written in either case.
    pub async fn exchange(&self, key: &str, new: Option<&Value>) -> Result<Option<Value>> {
        let Some(new) = new else {
            log::debug!("{}: nothing fetched", key);
            return Err(AppError::NoUpdate);
        };

        let old = match self.store.get_optional(key).await? {
            Some(text) => {
                let old = encoding::decode(&text)?;
                if old == *new {
                    log::debug!("{}: unchanged", key);
                    return Err(AppError::NoUpdate);
                }
                Some(old)
            }
            None => None,
        };

        self.store.set(key, &encoding::encode(new)?).await?;
        log::debug!(
            "{}: baseline {}",
            key,
            if old.is_some() { "replaced" } else { "created" }
        );
        Ok(old)
    }

    /// Reconcile a topic with its topic-specific strategy.
    ///
    /// The first observation of a topic returns the new value verbatim.
    pub async fn reconcile(&self, topic: Topic, new: Option<Value>) -> Result<String> {
        let old = self.exchange(topic.key(), new.as_ref()).await?;
        let Some(mut document) = new else {
            return Err(AppError::NoUpdate);
        };

        if let Some(old) = old {
            DiffStrategy::for_topic(topic)
                .apply(&old, &mut document)
                .map_err(|e| AppError::shape(topic.as_str(), e))?;
        }

        encoding::encode(&document)
    }

    /// Decoded baseline currently stored for a topic, if any.
    pub async fn baseline(&self, topic: Topic) -> Result<Option<Value>> {
        self.store
            .get_optional(topic.key())
            .await?
            .map(|text| encoding::decode(&text))
            .transpose()
    }

    /// grade -> class names, diffed per grade.
    pub async fn diff_class_list(&self, new: Option<Value>) -> Result<String> {
        self.reconcile(Topic::ClassList, new).await
    }

    /// Months of day entries, diffed per month.
    pub async fn diff_study_plan(&self, new: Option<Value>) -> Result<String> {
        self.reconcile(Topic::StudyPlan, new).await
    }

    /// Ring schedule; always transmitted whole.
    pub async fn diff_rings_timetable(&self, new: Option<Value>) -> Result<String> {
        self.reconcile(Topic::RingsTimetable, new).await
    }

    /// class -> timetable, diffed per lesson slot.
    pub async fn diff_full_perm_timetable(&self, new: Option<Value>) -> Result<String> {
        self.reconcile(Topic::FullPermTimetable, new).await
    }

    /// Teacher records matched by `abbr`, diffed per field.
    pub async fn diff_teachers(&self, new: Option<Value>) -> Result<String> {
        self.reconcile(Topic::Teachers, new).await
    }

    /// Day bulletins matched by `(day, month)`, diffed per field.
    pub async fn diff_changes(&self, new: Option<Value>) -> Result<String> {
        self.reconcile(Topic::Changes, new).await
    }

    /// day -> lesson -> floor -> rooms, diffed per floor.
    pub async fn diff_vacant_rooms(&self, new: Option<Value>) -> Result<String> {
        self.reconcile(Topic::VacantRooms, new).await
    }

    /// class -> {teacher, subject}; always transmitted whole.
    pub async fn diff_class_teachers(&self, new: Option<Value>) -> Result<String> {
        self.reconcile(Topic::ClassTeachers, new).await
    }
}
