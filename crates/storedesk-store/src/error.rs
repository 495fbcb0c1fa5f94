//! Store error types.

use thiserror::Error;

/// Errors that can occur when using the store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the store.
    #[error("Failed to open store: {0}")]
    OpenError(String),

    /// Failed to serialize or parse a value.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to perform store operation.
    #[error("Store operation failed: {0}")]
    StoreError(String),

    /// Key not found.
    #[error("Key not found: {0}")]
    NotFound(String),

    /// A document with this key already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The stored version moved on since it was read.
    #[error("Concurrent modification of {key}: expected version {expected}, found {found}")]
    ConcurrentModification {
        key: String,
        expected: u64,
        found: u64,
    },
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::StoreError(e.to_string())
    }
}
