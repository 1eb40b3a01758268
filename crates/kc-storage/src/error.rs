//! Storage error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during attribute storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The user owning the attribute store no longer exists.
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Invalid attribute name or value.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Backend connection error.
    #[error("Storage connection error: {0}")]
    Connection(String),

    /// Backend query error.
    #[error("Storage query error: {0}")]
    Query(String),

    /// Transaction error (e.g. write conflict that the backend gave up on).
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Internal error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Creates an invalid data error.
    #[must_use]
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
