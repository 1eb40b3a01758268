//! Typed configuration of the random string mapper.
//!
//! The host hands mapper settings over as a string map ([`MapperConfig`]).
//! [`RandomStringConfig`] applies the defaults and validates the values once,
//! so a bad `stringLength` fails before any attribute is touched.

use std::num::NonZeroUsize;

use kc_protocol_oidc::MapperConfig;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ProvisionError, ProvisionResult};
use crate::mapper::PROVIDER_ID;

/// Config key naming the user attribute that holds the random string.
pub const CONFIG_USER_ATTRIBUTE: &str = "userAttribute";

/// Config key holding the length of generated strings.
pub const CONFIG_STRING_LENGTH: &str = "stringLength";

/// Attribute name used when none is configured.
pub const DEFAULT_USER_ATTRIBUTE: &str = "randomString";

/// Length used when none is configured.
pub const DEFAULT_STRING_LENGTH: NonZeroUsize = NonZeroUsize::new(32).unwrap();

/// Longest string the mapper will generate.
pub const MAX_STRING_LENGTH: usize = 4096;

/// Validated random string mapper settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomStringConfig {
    /// User attribute storing the random string.
    pub user_attribute: String,

    /// Number of characters of a generated string.
    #[serde(deserialize_with = "deserialize_string_length")]
    pub string_length: NonZeroUsize,
}

impl Default for RandomStringConfig {
    fn default() -> Self {
        Self {
            user_attribute: DEFAULT_USER_ATTRIBUTE.to_string(),
            string_length: DEFAULT_STRING_LENGTH,
        }
    }
}

impl RandomStringConfig {
    /// Reads the settings from a mapper configuration, applying defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the attribute name is empty or the
    /// length is not a positive integer up to [`MAX_STRING_LENGTH`].
    pub fn from_mapper_config(config: &MapperConfig) -> ProvisionResult<Self> {
        let user_attribute = config.get_or(CONFIG_USER_ATTRIBUTE, DEFAULT_USER_ATTRIBUTE);
        if user_attribute.is_empty() {
            return Err(ProvisionError::InvalidConfiguration(format!(
                "{CONFIG_USER_ATTRIBUTE} must not be empty"
            )));
        }

        let string_length = match config.get(CONFIG_STRING_LENGTH) {
            Some(raw) => parse_string_length(raw)?,
            None => DEFAULT_STRING_LENGTH,
        };

        Ok(Self {
            user_attribute: user_attribute.to_string(),
            string_length,
        })
    }

    /// Builds a mapper configuration carrying these settings.
    #[must_use]
    pub fn into_mapper_config(self, name: impl Into<String>) -> MapperConfig {
        MapperConfig::new(name, PROVIDER_ID)
            .with_config(CONFIG_USER_ATTRIBUTE, self.user_attribute)
            .with_config(CONFIG_STRING_LENGTH, self.string_length.to_string())
    }
}

/// Parses a string-encoded positive length.
///
/// # Errors
///
/// Returns `InvalidConfiguration` for non-numeric, zero or negative input,
/// and for lengths above [`MAX_STRING_LENGTH`].
pub fn parse_string_length(raw: &str) -> ProvisionResult<NonZeroUsize> {
    let length = raw.parse::<NonZeroUsize>().map_err(|_| {
        ProvisionError::InvalidConfiguration(format!(
            "{CONFIG_STRING_LENGTH} must be a positive integer, got {raw:?}"
        ))
    })?;

    if length.get() > MAX_STRING_LENGTH {
        return Err(ProvisionError::InvalidConfiguration(format!(
            "{CONFIG_STRING_LENGTH} must not exceed {MAX_STRING_LENGTH}, got {length}"
        )));
    }

    Ok(length)
}

fn deserialize_string_length<'de, D>(deserializer: D) -> Result<NonZeroUsize, D::Error>
where
    D: Deserializer<'de>,
{
    let length = NonZeroUsize::deserialize(deserializer)?;
    if length.get() > MAX_STRING_LENGTH {
        return Err(serde::de::Error::custom(format!(
            "{CONFIG_STRING_LENGTH} must not exceed {MAX_STRING_LENGTH}"
        )));
    }
    Ok(length)
}
