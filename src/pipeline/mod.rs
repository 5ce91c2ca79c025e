//! Reconciliation pipeline.
//!
//! - `diff`: pure per-shape diff strategies
//! - `engine`: snapshot exchange and per-topic reconciliation
//! - `update`: one fetch → reconcile → notify pass

pub mod diff;
pub mod engine;
pub mod update;

pub use diff::{DiffStrategy, RecordKey, ShapeError};
pub use engine::DiffEngine;
pub use update::{UpdateOutcome, run_update};
