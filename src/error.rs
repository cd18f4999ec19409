//! Error types for durable storage access.

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::storage::KeyValueStore) or by the
/// JSON layer sitting on top of it.
///
/// None of these are fatal: trackers and the search history log them and keep
/// working from their in-memory state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store could not be obtained (private mode, no window, ...)
    #[error("Storage unavailable")]
    Unavailable,
    /// Reading a key failed
    #[error("Failed to read '{0}'")]
    Read(String),
    /// Writing a key failed, usually because the quota is exhausted
    #[error("Failed to write '{0}'")]
    Write(String),
    /// The stored payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
