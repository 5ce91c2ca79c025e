// src/error.rs

//! Unified error handling for the updater.

use std::fmt;

use thiserror::Error;

/// Result type alias for updater operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Nothing to transmit: the fetch failed or the topic is unchanged.
    ///
    /// This is a normal outcome, not a defect.
    #[error("no update needed")]
    NoUpdate,

    /// Snapshot store has no value under this key
    #[error("no value with this key: {key}")]
    NotFound { key: String },

    /// AWS S3 error
    #[error("S3 error: {0}")]
    S3(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Old and new snapshots of a topic do not line up
    #[error("Shape mismatch in {topic}: {message}")]
    Shape { topic: String, message: String },

    /// Push notification rejected
    #[error("Notification error: {0}")]
    Notify(String),
}

impl AppError {
    /// Create a not-found error for a store key.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a shape mismatch error with the topic as context.
    pub fn shape(topic: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Shape {
            topic: topic.into(),
            message: message.to_string(),
        }
    }

    /// Create a notification error.
    pub fn notify(message: impl fmt::Display) -> Self {
        Self::Notify(message.to_string())
    }

    pub fn is_no_update(&self) -> bool {
        matches!(self, Self::NoUpdate)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(AppError::NoUpdate.is_no_update());
        assert!(AppError::not_found("teachers").is_not_found());
        assert!(!AppError::config("x").is_no_update());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            AppError::not_found("changes").to_string(),
            "no value with this key: changes"
        );
        assert_eq!(
            AppError::shape("vacant_rooms", "day 2 missing").to_string(),
            "Shape mismatch in vacant_rooms: day 2 missing"
        );
    }
}
