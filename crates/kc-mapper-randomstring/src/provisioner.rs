//! Lazy provisioning of the random string attribute.
//!
//! The first issuance that finds the attribute missing generates a value and
//! stores it with [`UserAttributeStore::set_if_absent`]. Every later issuance
//! reads the stored value back; it is never regenerated while it exists.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use kc_crypto::random_alphanumeric;
use kc_storage::UserAttributeStore;

use crate::config::{MAX_STRING_LENGTH, RandomStringConfig};
use crate::error::{ProvisionError, ProvisionResult};

type Generator = Arc<dyn Fn(usize) -> String + Send + Sync>;

/// Ensures a user attribute holds a random string and returns its values.
#[derive(Clone)]
pub struct ClaimProvisioner {
    generator: Generator,
}

impl ClaimProvisioner {
    /// Creates a provisioner generating secure random alphanumeric strings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            generator: Arc::new(random_alphanumeric),
        }
    }

    /// Creates a provisioner with a custom string generator.
    ///
    /// The generator receives the requested length and must return an
    /// alphanumeric string of exactly that many characters.
    #[must_use]
    pub fn with_generator<F>(generator: F) -> Self
    where
        F: Fn(usize) -> String + Send + Sync + 'static,
    {
        Self {
            generator: Arc::new(generator),
        }
    }

    /// Returns the values of `attribute_key`, generating a random string of
    /// `random_length` characters first if the attribute does not exist.
    ///
    /// At most one write happens, and only when the attribute is absent. When
    /// a concurrent request stores a value first, that value is returned.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for an empty attribute key or a length
    /// above [`MAX_STRING_LENGTH`], and store errors unchanged.
    pub async fn provision(
        &self,
        store: &dyn UserAttributeStore,
        attribute_key: &str,
        random_length: NonZeroUsize,
    ) -> ProvisionResult<Vec<String>> {
        if attribute_key.is_empty() {
            return Err(ProvisionError::InvalidConfiguration(
                "attribute key must not be empty".to_string(),
            ));
        }
        if random_length.get() > MAX_STRING_LENGTH {
            return Err(ProvisionError::InvalidConfiguration(format!(
                "random string length must not exceed {MAX_STRING_LENGTH}, got {random_length}"
            )));
        }

        if let Some(values) = store.get(attribute_key).await? {
            tracing::debug!(
                user_id = %store.user_id(),
                attribute = attribute_key,
                "Reusing existing random string attribute"
            );
            return Ok(values);
        }

        let generated = (self.generator)(random_length.get());
        let values = store
            .set_if_absent(attribute_key, vec![generated.clone()])
            .await?;

        if values.len() == 1 && values[0] == generated {
            tracing::debug!(
                user_id = %store.user_id(),
                attribute = attribute_key,
                length = random_length.get(),
                "Provisioned random string attribute"
            );
        } else {
            tracing::debug!(
                user_id = %store.user_id(),
                attribute = attribute_key,
                "Random string attribute was provisioned concurrently"
            );
        }

        Ok(values)
    }

    /// Provisions using validated mapper settings.
    ///
    /// # Errors
    ///
    /// Same as [`ClaimProvisioner::provision`].
    pub async fn provision_with_config(
        &self,
        store: &dyn UserAttributeStore,
        config: &RandomStringConfig,
    ) -> ProvisionResult<Vec<String>> {
        self.provision(store, &config.user_attribute, config.string_length)
            .await
    }
}

impl Default for ClaimProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClaimProvisioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimProvisioner").finish_non_exhaustive()
    }
}
