//! Error types for the fitness tracker core

use thiserror::Error;

/// Errors that can occur while tracking steps
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Failed to parse sensor input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid sensor event: {0}")]
    InvalidEvent(#[from] crate::sensor::ValidationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
