// src/pipeline/update.rs

//! One update pass for a single topic: fetch, reconcile, notify.

use crate::error::Result;
use crate::models::Topic;
use crate::pipeline::DiffEngine;
use crate::services::{Fetcher, Notifier};

/// How an update pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Baseline committed and the diff document delivered
    Sent { document: String },
    /// Baseline committed and the diff document only logged (dry run)
    Logged { document: String },
    /// Fetch failed or nothing changed; nothing was written or sent
    Unchanged,
    /// Baseline committed but the notifier failed
    NotifyFailed { document: String, error: String },
}

/// Run one update pass for `topic`.
///
/// `NoUpdate` is a normal outcome. Notifier failures are logged and never
/// roll back the committed baseline; any other error propagates.
pub async fn run_update(
    topic: Topic,
    fetcher: &dyn Fetcher,
    engine: &DiffEngine,
    notifier: &dyn Notifier,
) -> Result<UpdateOutcome> {
    let fetched = fetcher.fetch(topic).await;

    let document = match engine.reconcile(topic, fetched).await {
        Ok(document) => document,
        Err(e) if e.is_no_update() => {
            log::info!("{}: no update needed", topic);
            return Ok(UpdateOutcome::Unchanged);
        }
        Err(e) => return Err(e),
    };

    log::debug!("computed diff for {}", topic);
    log::debug!("{}", document);

    match notifier.send(topic, &document).await {
        Ok(()) if notifier.delivers() => {
            log::info!("{}: update sent ({} bytes)", topic, document.len());
            Ok(UpdateOutcome::Sent { document })
        }
        Ok(()) => {
            log::info!("{}: update logged, not pushed ({} bytes)", topic, document.len());
            Ok(UpdateOutcome::Logged { document })
        }
        Err(e) => {
            log::error!("{}: {}", topic, e);
            Ok(UpdateOutcome::NotifyFailed {
                document,
                error: e.to_string(),
            })
        }
    }
}
