//! The random string protocol mapper.

use std::sync::Arc;

use async_trait::async_trait;
use kc_protocol_oidc::{
    AccessTokenClaims, AccessTokenMapper, ConfigProperty, IdTokenClaims, IdTokenMapper,
    MapperConfig, MapperContext, OidcResult, ProtocolMapper, ProtocolMapperRegistry,
    UserInfoClaims, UserInfoMapper, attribute_claim_properties, map_claim,
};

use crate::config::{
    CONFIG_STRING_LENGTH, CONFIG_USER_ATTRIBUTE, DEFAULT_STRING_LENGTH, DEFAULT_USER_ATTRIBUTE,
    RandomStringConfig,
};
use crate::provisioner::ClaimProvisioner;

/// Provider ID of the random string mapper.
pub const PROVIDER_ID: &str = "oidc-randomstring-protocol-mapper";

/// Emits a per-user random string as a token claim.
///
/// The string lives in a user attribute and is generated the first time a
/// token is issued for a user who does not have it yet.
#[derive(Debug, Clone, Default)]
pub struct RandomStringMapper {
    provisioner: ClaimProvisioner,
}

impl RandomStringMapper {
    /// Creates a mapper with the default secure generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mapper using a specific provisioner.
    #[must_use]
    pub const fn with_provisioner(provisioner: ClaimProvisioner) -> Self {
        Self { provisioner }
    }

    /// Provisions the attribute and returns the values to emit.
    ///
    /// Returns `None` when the context carries no user.
    async fn claim_values(
        &self,
        config: &MapperConfig,
        context: &MapperContext<'_>,
    ) -> OidcResult<Option<Vec<String>>> {
        let settings = RandomStringConfig::from_mapper_config(config).inspect_err(|e| {
            tracing::warn!(mapper = %config.name, realm = context.realm, "Rejecting mapper: {}", e);
        })?;

        let Some(store) = context.user_attributes else {
            tracing::debug!(mapper = %config.name, "No user in context, skipping");
            return Ok(None);
        };

        let values = self
            .provisioner
            .provision_with_config(store, &settings)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    mapper = %config.name,
                    user_id = %store.user_id(),
                    "Random string provisioning failed: {}",
                    e
                );
            })?;

        Ok(Some(values))
    }
}

impl ProtocolMapper for RandomStringMapper {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn display_name(&self) -> &'static str {
        "Random String Mapper"
    }

    fn category(&self) -> &'static str {
        "Token mapper"
    }

    fn help_text(&self) -> &'static str {
        "A oidc token mapper that generates a new random string if the corresponding user attribute not already exists."
    }

    fn config_properties(&self) -> Vec<ConfigProperty> {
        let mut properties = vec![
            ConfigProperty::string(CONFIG_USER_ATTRIBUTE, "User Attribute Name for random string")
                .with_help("The User Attribute which is used to fetch/store random string.")
                .with_default(DEFAULT_USER_ATTRIBUTE),
            ConfigProperty::string(CONFIG_STRING_LENGTH, "random string length")
                .with_help("Length for generated random string.")
                .with_default(DEFAULT_STRING_LENGTH.to_string()),
        ];
        properties.extend(attribute_claim_properties());
        properties
    }

    fn validate_config(&self, config: &MapperConfig) -> OidcResult<()> {
        RandomStringConfig::from_mapper_config(config)?;
        Ok(())
    }
}

#[async_trait]
impl IdTokenMapper for RandomStringMapper {
    async fn transform_id_token(
        &self,
        claims: &mut IdTokenClaims,
        config: &MapperConfig,
        context: &MapperContext<'_>,
    ) -> OidcResult<()> {
        if let Some(values) = self.claim_values(config, context).await? {
            map_claim(&mut claims.additional, config, &values);
        }
        Ok(())
    }
}

#[async_trait]
impl AccessTokenMapper for RandomStringMapper {
    async fn transform_access_token(
        &self,
        claims: &mut AccessTokenClaims,
        config: &MapperConfig,
        context: &MapperContext<'_>,
    ) -> OidcResult<()> {
        if let Some(values) = self.claim_values(config, context).await? {
            map_claim(&mut claims.additional, config, &values);
        }
        Ok(())
    }
}

#[async_trait]
impl UserInfoMapper for RandomStringMapper {
    async fn transform_userinfo(
        &self,
        claims: &mut UserInfoClaims,
        config: &MapperConfig,
        context: &MapperContext<'_>,
    ) -> OidcResult<()> {
        if let Some(values) = self.claim_values(config, context).await? {
            map_claim(&mut claims.additional, config, &values);
        }
        Ok(())
    }
}

/// Registers the default random string mapper with the ID token, access
/// token and userinfo hook points.
pub fn register(registry: &mut ProtocolMapperRegistry) {
    register_mapper(registry, Arc::new(RandomStringMapper::new()));
}

/// Registers a specific mapper instance with all three hook points.
pub fn register_mapper(registry: &mut ProtocolMapperRegistry, mapper: Arc<RandomStringMapper>) {
    registry.register_id_token_mapper(Arc::clone(&mapper));
    registry.register_access_token_mapper(Arc::clone(&mapper));
    registry.register_userinfo_mapper(mapper);
}
