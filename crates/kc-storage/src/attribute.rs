//! User attribute storage trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageResult;

/// Attribute storage scoped to a single user.
///
/// Attributes map a name to an ordered list of values. Implementations must be
/// thread-safe: several token requests for the same user may hold the same
/// store concurrently.
#[async_trait]
pub trait UserAttributeStore: Send + Sync {
    /// Returns the ID of the user owning these attributes.
    fn user_id(&self) -> Uuid;

    /// Checks whether an attribute exists, even with an empty value list.
    async fn has(&self, name: &str) -> StorageResult<bool>;

    /// Gets all values of an attribute.
    async fn get(&self, name: &str) -> StorageResult<Option<Vec<String>>>;

    /// Replaces the values of an attribute.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::InvalidData` if the attribute name is empty.
    async fn set(&self, name: &str, values: Vec<String>) -> StorageResult<()>;

    /// Stores `values` only if the attribute does not exist yet.
    ///
    /// The check and the write happen atomically. Returns the values held by
    /// the attribute after the call: `values` if this call created it, the
    /// existing values otherwise.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::InvalidData` if the attribute name is empty.
    async fn set_if_absent(&self, name: &str, values: Vec<String>) -> StorageResult<Vec<String>>;

    /// Removes an attribute, returning its previous values.
    async fn remove(&self, name: &str) -> StorageResult<Option<Vec<String>>>;
}
