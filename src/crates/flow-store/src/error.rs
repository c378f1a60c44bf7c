//! Error types for run-store operations

use thiserror::Error;

/// Result type for run-store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while reading or writing the run store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Requested workflow, run, or memory record does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Failed to (de)serialize a stored record
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific storage failure (connection, query, etc.)
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error from a backend that touches the filesystem or network directly
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
