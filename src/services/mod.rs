//! Collaborators around the engine: where values come from and where diffs go.

pub mod fetcher;
pub mod notifier;

pub use fetcher::{Fetcher, JsonFileFetcher};
pub use notifier::{LogNotifier, Notifier, OneSignalNotifier};
