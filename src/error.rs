//! Error types for the vocabulary store
//!
//! Mutators validate before touching durable state, so `Validation`,
//! `InvalidIndex` and `NoCategorySelected` are always raised with the
//! in-memory snapshot untouched. `Storage` is raised after a failed
//! durable write; the snapshot stays at its last persisted value.

use thiserror::Error;

/// Result type alias for vocabulary store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the vocabulary trainer
#[derive(Error, Debug)]
pub enum Error {
    /// A required input was empty after trimming
    #[error("Validation error: {0}")]
    Validation(String),

    /// A category index was out of range
    #[error("Invalid index: {0}")]
    InvalidIndex(usize),

    /// The target category vanished (nothing selected, or selection stale)
    #[error("No category selected")]
    NoCategorySelected,

    /// The durable store failed to read or write
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("serialization failed: {err}"))
    }
}
