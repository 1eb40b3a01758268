//! OIDC protocol error types.

use kc_storage::StorageError;
use thiserror::Error;

/// OIDC protocol errors raised while issuing tokens.
#[derive(Debug, Error)]
pub enum OidcError {
    /// Invalid request parameters.
    #[error("invalid_request: {0}")]
    InvalidRequest(String),

    /// A protocol mapper is configured with invalid values.
    #[error("invalid mapper configuration: {0}")]
    InvalidConfiguration(String),

    /// Attribute storage failed while a mapper was running.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for OIDC operations.
pub type OidcResult<T> = Result<T, OidcError>;
