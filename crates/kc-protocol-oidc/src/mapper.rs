//! Protocol Mapper SPI for customizing token claims.
//!
//! ## Design
//!
//! The mapper system follows the SPI (Service Provider Interface) pattern:
//! - [`ProtocolMapper`] trait defines the contract every mapper fulfils
//! - [`MapperConfig`] provides configuration for each mapper instance
//! - [`ProtocolMapperRegistry`] manages registration and dispatch
//! - [`map_claim`] places a mapped value into a claim set
//!
//! ## Hook Points
//!
//! A mapper takes part in token issuance by implementing one trait per hook
//! point and being registered against it explicitly:
//! - [`IdTokenMapper`] - ID tokens
//! - [`AccessTokenMapper`] - access tokens
//! - [`UserInfoMapper`] - userinfo responses

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kc_storage::UserAttributeStore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::claims::{AccessTokenClaims, IdTokenClaims, UserInfoClaims};
use crate::error::{OidcError, OidcResult};

/// Well-known mapper configuration keys.
pub mod keys {
    /// Name of the claim the mapped value is written to.
    pub const CLAIM_NAME: &str = "claim.name";
    /// JSON type of the claim value.
    pub const JSON_TYPE: &str = "jsonType.label";
    /// Whether all values are emitted as an array.
    pub const MULTIVALUED: &str = "multivalued";
    /// Include the claim in ID tokens.
    pub const ID_TOKEN_CLAIM: &str = "id.token.claim";
    /// Include the claim in access tokens.
    pub const ACCESS_TOKEN_CLAIM: &str = "access.token.claim";
    /// Include the claim in userinfo responses.
    pub const USERINFO_TOKEN_CLAIM: &str = "userinfo.token.claim";
}

/// Hook point a mapper can be registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// ID token.
    IdToken,
    /// Access token.
    AccessToken,
    /// `UserInfo` response.
    UserInfo,
}

impl TokenType {
    /// Returns the configuration switch controlling this hook point.
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::IdToken => keys::ID_TOKEN_CLAIM,
            Self::AccessToken => keys::ACCESS_TOKEN_CLAIM,
            Self::UserInfo => keys::USERINFO_TOKEN_CLAIM,
        }
    }
}

/// Claim value type for JSON serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimValueType {
    /// String value.
    #[default]
    String,
    /// Integer (long) value.
    Long,
    /// Integer value.
    Int,
    /// Boolean value.
    Boolean,
    /// JSON object or array.
    Json,
}

/// Configuration for a protocol mapper instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Unique identifier for this mapper instance.
    pub id: Uuid,

    /// Mapper name (user-defined).
    pub name: String,

    /// Protocol mapper type ID (e.g., `"oidc-randomstring-protocol-mapper"`).
    pub mapper_type: String,

    /// Protocol (always `"openid-connect"` for OIDC).
    pub protocol: String,

    /// Configuration key-value pairs.
    #[serde(default)]
    pub config: HashMap<String, String>,
}

impl MapperConfig {
    /// Creates a new mapper configuration.
    #[must_use]
    pub fn new(name: impl Into<String>, mapper_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            mapper_type: mapper_type.into(),
            protocol: "openid-connect".to_string(),
            config: HashMap::new(),
        }
    }

    /// Sets a configuration value.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Gets a configuration value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Gets a configuration value as a boolean.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.config.get(key).and_then(|v| v.parse().ok())
    }

    /// Gets a configuration value, returning a default if not present.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.config.get(key).map_or(default, String::as_str)
    }

    /// Checks if the mapper should run for a hook point. Defaults to `true`.
    #[must_use]
    pub fn include_in(&self, token_type: TokenType) -> bool {
        self.get_bool(token_type.config_key()).unwrap_or(true)
    }

    /// Gets the claim name to use in tokens.
    #[must_use]
    pub fn claim_name(&self) -> Option<&str> {
        self.get(keys::CLAIM_NAME).filter(|name| !name.is_empty())
    }

    /// Gets the JSON type for the claim value.
    #[must_use]
    pub fn json_type(&self) -> ClaimValueType {
        self.get(keys::JSON_TYPE)
            .and_then(|v| match v.to_lowercase().as_str() {
                "string" => Some(ClaimValueType::String),
                "long" => Some(ClaimValueType::Long),
                "int" => Some(ClaimValueType::Int),
                "boolean" => Some(ClaimValueType::Boolean),
                "json" => Some(ClaimValueType::Json),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Checks if the claim is multivalued.
    #[must_use]
    pub fn is_multivalued(&self) -> bool {
        self.get_bool(keys::MULTIVALUED).unwrap_or(false)
    }
}

/// Configuration property definition for mapper UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigProperty {
    /// Property name (config key).
    pub name: String,

    /// Display label.
    pub label: String,

    /// Help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,

    /// Property type.
    pub property_type: ConfigPropertyType,

    /// Default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// Options for select types.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<String>,
}

/// Configuration property type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigPropertyType {
    /// Text input.
    String,
    /// Boolean checkbox.
    Boolean,
    /// Select dropdown.
    List,
}

impl ConfigProperty {
    fn with_type(name: String, label: String, property_type: ConfigPropertyType) -> Self {
        Self {
            name,
            label,
            help_text: None,
            property_type,
            default_value: None,
            options: vec![],
        }
    }

    /// Creates a new string property.
    #[must_use]
    pub fn string(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_type(name.into(), label.into(), ConfigPropertyType::String)
    }

    /// Creates a new boolean property, defaulting to `false`.
    #[must_use]
    pub fn boolean(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_type(name.into(), label.into(), ConfigPropertyType::Boolean)
            .with_default("false")
    }

    /// Creates a new list (select) property.
    #[must_use]
    pub fn list(name: impl Into<String>, label: impl Into<String>, options: Vec<String>) -> Self {
        let mut property = Self::with_type(name.into(), label.into(), ConfigPropertyType::List);
        property.options = options;
        property
    }

    /// Sets the help text.
    #[must_use]
    pub fn with_help(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }
}

/// Standard properties shared by mappers that write one claim from user data.
///
/// Covers the claim name, JSON type, multivalued flag and the per-hook
/// inclusion switches.
#[must_use]
pub fn attribute_claim_properties() -> Vec<ConfigProperty> {
    vec![
        ConfigProperty::string(keys::CLAIM_NAME, "Token Claim Name")
            .with_help("Name of the claim to insert into the token. Use dots for nested claims."),
        ConfigProperty::list(
            keys::JSON_TYPE,
            "Claim JSON Type",
            vec![
                "String".to_string(),
                "long".to_string(),
                "int".to_string(),
                "boolean".to_string(),
                "JSON".to_string(),
            ],
        )
        .with_default("String"),
        ConfigProperty::boolean(keys::MULTIVALUED, "Multivalued")
            .with_help("Emit all values as an array instead of the first value only"),
        ConfigProperty::boolean(keys::ID_TOKEN_CLAIM, "Add to ID token").with_default("true"),
        ConfigProperty::boolean(keys::ACCESS_TOKEN_CLAIM, "Add to access token")
            .with_default("true"),
        ConfigProperty::boolean(keys::USERINFO_TOKEN_CLAIM, "Add to userinfo")
            .with_default("true"),
    ]
}

/// Context provided to mappers during token transformation.
#[derive(Clone, Copy)]
pub struct MapperContext<'a> {
    /// Realm name.
    pub realm: &'a str,

    /// Attribute store of the user the token is issued for.
    pub user_attributes: Option<&'a dyn UserAttributeStore>,
}

impl<'a> MapperContext<'a> {
    /// Creates a new mapper context without a user.
    #[must_use]
    pub const fn new(realm: &'a str) -> Self {
        Self {
            realm,
            user_attributes: None,
        }
    }

    /// Sets the attribute store of the token's user.
    #[must_use]
    pub const fn with_user_attributes(mut self, store: &'a dyn UserAttributeStore) -> Self {
        self.user_attributes = Some(store);
        self
    }
}

impl std::fmt::Debug for MapperContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperContext")
            .field("realm", &self.realm)
            .field("user_id", &self.user_attributes.map(|s| s.user_id()))
            .finish()
    }
}

/// Core trait for protocol mappers.
///
/// Each mapper has a unique ID, display information, and configuration properties.
pub trait ProtocolMapper: Send + Sync {
    /// Returns the unique identifier for this mapper type.
    fn id(&self) -> &'static str;

    /// Returns the display name shown in admin UIs.
    fn display_name(&self) -> &'static str;

    /// Returns the category used for grouping in admin UIs.
    fn category(&self) -> &'static str;

    /// Returns the help text shown in admin UIs.
    fn help_text(&self) -> &'static str {
        ""
    }

    /// Returns the configuration properties for this mapper.
    fn config_properties(&self) -> Vec<ConfigProperty>;

    /// Returns the priority for this mapper. Lower values execute first.
    fn priority(&self) -> i32 {
        0
    }

    /// Validates the mapper configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    fn validate_config(&self, _config: &MapperConfig) -> OidcResult<()> {
        Ok(())
    }
}

/// Trait for mappers that transform ID tokens.
#[async_trait]
pub trait IdTokenMapper: ProtocolMapper {
    /// Transforms an ID token by adding/modifying claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformation fails.
    async fn transform_id_token(
        &self,
        claims: &mut IdTokenClaims,
        config: &MapperConfig,
        context: &MapperContext<'_>,
    ) -> OidcResult<()>;
}

/// Trait for mappers that transform access tokens.
#[async_trait]
pub trait AccessTokenMapper: ProtocolMapper {
    /// Transforms an access token by adding/modifying claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformation fails.
    async fn transform_access_token(
        &self,
        claims: &mut AccessTokenClaims,
        config: &MapperConfig,
        context: &MapperContext<'_>,
    ) -> OidcResult<()>;
}

/// Trait for mappers that transform userinfo responses.
#[async_trait]
pub trait UserInfoMapper: ProtocolMapper {
    /// Transforms a userinfo response by adding/modifying claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformation fails.
    async fn transform_userinfo(
        &self,
        claims: &mut UserInfoClaims,
        config: &MapperConfig,
        context: &MapperContext<'_>,
    ) -> OidcResult<()>;
}

/// Registry for protocol mappers.
///
/// Mappers are registered per hook point; a mapper registered against no
/// hook point never runs.
#[derive(Default)]
pub struct ProtocolMapperRegistry {
    /// Registered mappers by ID.
    mappers: HashMap<String, Arc<dyn ProtocolMapper>>,

    /// ID token mappers.
    id_token_mappers: HashMap<String, Arc<dyn IdTokenMapper>>,

    /// Access token mappers.
    access_token_mappers: HashMap<String, Arc<dyn AccessTokenMapper>>,

    /// `UserInfo` mappers.
    userinfo_mappers: HashMap<String, Arc<dyn UserInfoMapper>>,
}

impl ProtocolMapperRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mapper against the ID token hook point.
    pub fn register_id_token_mapper<M>(&mut self, mapper: Arc<M>)
    where
        M: IdTokenMapper + 'static,
    {
        let id = mapper.id().to_string();
        self.mappers.insert(id.clone(), mapper.clone() as Arc<dyn ProtocolMapper>);
        self.id_token_mappers.insert(id, mapper);
    }

    /// Registers a mapper against the access token hook point.
    pub fn register_access_token_mapper<M>(&mut self, mapper: Arc<M>)
    where
        M: AccessTokenMapper + 'static,
    {
        let id = mapper.id().to_string();
        self.mappers.insert(id.clone(), mapper.clone() as Arc<dyn ProtocolMapper>);
        self.access_token_mappers.insert(id, mapper);
    }

    /// Registers a mapper against the userinfo hook point.
    pub fn register_userinfo_mapper<M>(&mut self, mapper: Arc<M>)
    where
        M: UserInfoMapper + 'static,
    {
        let id = mapper.id().to_string();
        self.mappers.insert(id.clone(), mapper.clone() as Arc<dyn ProtocolMapper>);
        self.userinfo_mappers.insert(id, mapper);
    }

    /// Gets a mapper by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<dyn ProtocolMapper>> {
        self.mappers.get(id)
    }

    /// Returns all registered mapper IDs.
    #[must_use]
    pub fn mapper_ids(&self) -> Vec<&str> {
        self.mappers.keys().map(String::as_str).collect()
    }

    /// Returns the hook points a mapper is registered against.
    #[must_use]
    pub fn hook_points(&self, id: &str) -> Vec<TokenType> {
        let mut hooks = Vec::new();
        if self.id_token_mappers.contains_key(id) {
            hooks.push(TokenType::IdToken);
        }
        if self.access_token_mappers.contains_key(id) {
            hooks.push(TokenType::AccessToken);
        }
        if self.userinfo_mappers.contains_key(id) {
            hooks.push(TokenType::UserInfo);
        }
        hooks
    }

    /// Validates a mapper configuration against its registered mapper.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an unknown mapper type, or the mapper's
    /// own validation error.
    pub fn validate(&self, config: &MapperConfig) -> OidcResult<()> {
        let mapper = self.get(&config.mapper_type).ok_or_else(|| {
            OidcError::InvalidRequest(format!("unknown mapper type: {}", config.mapper_type))
        })?;
        mapper.validate_config(config)
    }

    /// Filters configs for a hook point and orders them by mapper priority.
    fn ordered<'c>(
        &self,
        mapper_configs: &'c [MapperConfig],
        token_type: TokenType,
    ) -> Vec<&'c MapperConfig> {
        let mut configs: Vec<_> = mapper_configs
            .iter()
            .filter(|c| c.include_in(token_type))
            .collect();

        configs.sort_by_key(|c| self.get(&c.mapper_type).map_or(0, |m| m.priority()));
        configs
    }

    /// Applies all configured mappers to ID token claims.
    ///
    /// # Errors
    ///
    /// Returns the first mapper error; remaining mappers do not run.
    pub async fn apply_id_token_mappers(
        &self,
        claims: &mut IdTokenClaims,
        mapper_configs: &[MapperConfig],
        context: &MapperContext<'_>,
    ) -> OidcResult<()> {
        for config in self.ordered(mapper_configs, TokenType::IdToken) {
            if let Some(mapper) = self.id_token_mappers.get(&config.mapper_type) {
                mapper.transform_id_token(claims, config, context).await?;
            }
        }
        Ok(())
    }

    /// Applies all configured mappers to access token claims.
    ///
    /// # Errors
    ///
    /// Returns the first mapper error; remaining mappers do not run.
    pub async fn apply_access_token_mappers(
        &self,
        claims: &mut AccessTokenClaims,
        mapper_configs: &[MapperConfig],
        context: &MapperContext<'_>,
    ) -> OidcResult<()> {
        for config in self.ordered(mapper_configs, TokenType::AccessToken) {
            if let Some(mapper) = self.access_token_mappers.get(&config.mapper_type) {
                mapper.transform_access_token(claims, config, context).await?;
            }
        }
        Ok(())
    }

    /// Applies all configured mappers to a userinfo response.
    ///
    /// # Errors
    ///
    /// Returns the first mapper error; remaining mappers do not run.
    pub async fn apply_userinfo_mappers(
        &self,
        claims: &mut UserInfoClaims,
        mapper_configs: &[MapperConfig],
        context: &MapperContext<'_>,
    ) -> OidcResult<()> {
        for config in self.ordered(mapper_configs, TokenType::UserInfo) {
            if let Some(mapper) = self.userinfo_mappers.get(&config.mapper_type) {
                mapper.transform_userinfo(claims, config, context).await?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Claim placement
// ============================================================================

/// Places attribute values into a claim set according to a mapper config.
///
/// Nothing is written when the config has no claim name or `values` is empty.
/// Multivalued mappings emit a JSON array, others the first value only.
/// Values are converted to the configured JSON type.
pub fn map_claim(claims: &mut HashMap<String, Value>, config: &MapperConfig, values: &[String]) {
    let Some(claim_name) = config.claim_name() else {
        return;
    };
    let Some(first) = values.first() else {
        return;
    };

    let value = if config.is_multivalued() {
        convert_to_json_value(values, config.json_type())
    } else {
        convert_single_value(first, config.json_type())
    };
    set_claim_nested(claims, claim_name, value);
}

/// Converts a slice of strings to a JSON array based on the claim type.
fn convert_to_json_value(values: &[String], claim_type: ClaimValueType) -> Value {
    Value::Array(
        values
            .iter()
            .map(|v| convert_single_value(v, claim_type))
            .collect(),
    )
}

/// Converts a single string value to a JSON value based on the claim type.
///
/// Values that do not parse as the requested type stay strings.
fn convert_single_value(value: &str, claim_type: ClaimValueType) -> Value {
    match claim_type {
        ClaimValueType::String => Value::String(value.to_string()),
        ClaimValueType::Long | ClaimValueType::Int => value.parse::<i64>().map_or_else(
            |_| Value::String(value.to_string()),
            |n| Value::Number(n.into()),
        ),
        ClaimValueType::Boolean => value
            .parse::<bool>()
            .map_or_else(|_| Value::String(value.to_string()), Value::Bool),
        ClaimValueType::Json => {
            serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
        }
    }
}

/// Sets a claim value, supporting nested paths (e.g., `"address.country"`).
///
/// An existing non-object claim on the path is left untouched.
fn set_claim_nested(claims: &mut HashMap<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            claims.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = claims
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(obj) = entry {
                set_object_nested(obj, rest, value);
            }
        }
    }
}

fn set_object_nested(obj: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            obj.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = obj
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(inner) = entry {
                set_object_nested(inner, rest, value);
            }
        }
    }
}
