//! In-memory attribute storage.
//!
//! Backs tests and single-node deployments. Values live in `DashMap`s, whose
//! entry API gives `set_if_absent` its atomicity.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use crate::attribute::UserAttributeStore;
use crate::error::{StorageError, StorageResult};

type AttributeMap = DashMap<String, Vec<String>>;

/// In-memory attribute storage for all users of a realm.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAttributeProvider {
    users: Arc<DashMap<Uuid, Arc<AttributeMap>>>,
}

impl InMemoryAttributeProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the attribute store of a user, creating an empty one if needed.
    ///
    /// Stores returned for the same user share their data.
    #[must_use]
    pub fn for_user(&self, user_id: Uuid) -> InMemoryUserAttributes {
        let attributes = Arc::clone(self.users.entry(user_id).or_default().value());
        InMemoryUserAttributes {
            user_id,
            attributes,
        }
    }

    /// Returns the number of users with a store.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

/// In-memory attribute store of a single user.
///
/// Cloning is cheap and clones share the underlying attributes.
#[derive(Debug, Clone)]
pub struct InMemoryUserAttributes {
    user_id: Uuid,
    attributes: Arc<AttributeMap>,
}

impl InMemoryUserAttributes {
    /// Creates an empty store for a user.
    #[must_use]
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            attributes: Arc::new(DashMap::new()),
        }
    }

    /// Creates a store pre-populated with attributes.
    #[must_use]
    pub fn with_attributes(user_id: Uuid, attributes: HashMap<String, Vec<String>>) -> Self {
        Self {
            user_id,
            attributes: Arc::new(attributes.into_iter().collect()),
        }
    }

    /// Returns a copy of all attributes.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Vec<String>> {
        self.attributes
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

fn check_name(name: &str) -> StorageResult<()> {
    if name.is_empty() {
        return Err(StorageError::invalid_data("attribute name must not be empty"));
    }
    Ok(())
}

#[async_trait]
impl UserAttributeStore for InMemoryUserAttributes {
    fn user_id(&self) -> Uuid {
        self.user_id
    }

    async fn has(&self, name: &str) -> StorageResult<bool> {
        Ok(self.attributes.contains_key(name))
    }

    async fn get(&self, name: &str) -> StorageResult<Option<Vec<String>>> {
        Ok(self.attributes.get(name).map(|values| values.clone()))
    }

    async fn set(&self, name: &str, values: Vec<String>) -> StorageResult<()> {
        check_name(name)?;
        self.attributes.insert(name.to_string(), values);
        Ok(())
    }

    async fn set_if_absent(&self, name: &str, values: Vec<String>) -> StorageResult<Vec<String>> {
        check_name(name)?;
        match self.attributes.entry(name.to_string()) {
            Entry::Occupied(existing) => Ok(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(values.clone());
                Ok(values)
            }
        }
    }

    async fn remove(&self, name: &str) -> StorageResult<Option<Vec<String>>> {
        Ok(self.attributes.remove(name).map(|(_, values)| values))
    }
}
