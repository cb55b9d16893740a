//! Error types for braindrop-core

use thiserror::Error;

use crate::idea::IdeaId;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the idea store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Candidate idea failed validation; nothing was persisted
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No idea with this id exists
    #[error("Idea not found: {0}")]
    NotFound(IdeaId),

    /// The persistence medium could not be read or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Persisted data exists but is not a valid idea collection
    #[error("Decode error: {0}")]
    Decode(String),

    /// An operation was issued before `initialize` succeeded
    #[error("Idea store is not initialized")]
    NotInitialized,
}

/// Reasons a candidate idea is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("text ideas must have content")]
    EmptyContent,
}

/// Errors from a persistence adapter.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Medium not accessible (I/O failure, database error, quota exceeded)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Stored blob does not parse as an idea collection
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(msg) => StoreError::StorageUnavailable(msg),
            StorageError::Decode(msg) => StoreError::Decode(msg),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Unavailable(err.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Unavailable(format!("sqlite: {}", err))
    }
}
