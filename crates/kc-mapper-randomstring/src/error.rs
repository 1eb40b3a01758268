//! Provisioning error types.

use kc_protocol_oidc::OidcError;
use kc_storage::StorageError;
use thiserror::Error;

/// Errors raised while provisioning the random string attribute.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The mapper configuration cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The attribute store failed; propagated unchanged.
    #[error(transparent)]
    Store(#[from] StorageError),
}

impl From<ProvisionError> for OidcError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::InvalidConfiguration(message) => Self::InvalidConfiguration(message),
            ProvisionError::Store(source) => Self::Storage(source),
        }
    }
}

/// Result type for provisioning operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;
