// src/models/mod.rs

//! Domain models for the updater.

mod config;
mod topic;

// Re-export all public types
pub use config::{
    Config, FetchConfig, LoggingConfig, NotifierConfig, StorageBackend, StorageConfig,
};
pub use topic::Topic;
