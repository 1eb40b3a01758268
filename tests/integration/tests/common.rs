//! Common test utilities and fixtures.

use chrono::{Duration, Utc};
use kc_protocol_oidc::{
    AccessTokenClaims, IdTokenClaims, MapperConfig, MapperContext, ProtocolMapperRegistry,
    UserInfoClaims,
};
use kc_storage::{InMemoryAttributeProvider, InMemoryUserAttributes};
use uuid::Uuid;

/// Realm used by all tests.
pub const REALM: &str = "test";

/// Claims produced by one simulated issuance.
#[derive(Debug)]
pub struct IssuedTokens {
    /// ID token claims.
    pub id_token: IdTokenClaims,
    /// Access token claims.
    pub access_token: AccessTokenClaims,
    /// Userinfo response claims.
    pub userinfo: UserInfoClaims,
}

/// Test environment holding the registry, mapper configs and user storage.
pub struct TestEnv {
    /// Mapper registry with the random string mapper registered.
    pub registry: ProtocolMapperRegistry,
    /// Mapper configurations attached to the client.
    pub mapper_configs: Vec<MapperConfig>,
    /// User attribute storage.
    pub users: InMemoryAttributeProvider,
}

impl TestEnv {
    /// Creates a new environment with the given mapper configurations.
    pub fn new(mapper_configs: Vec<MapperConfig>) -> anyhow::Result<Self> {
        // Initialize tracing for tests
        let _ = tracing_subscriber::fmt()
            .with_env_filter("kc_mapper_randomstring=debug")
            .with_test_writer()
            .try_init();

        let mut registry = ProtocolMapperRegistry::new();
        kc_mapper_randomstring::register(&mut registry);

        for config in &mapper_configs {
            registry.validate(config)?;
        }

        Ok(Self {
            registry,
            mapper_configs,
            users: InMemoryAttributeProvider::new(),
        })
    }

    /// Returns the attribute store of a user.
    pub fn user(&self, user_id: Uuid) -> InMemoryUserAttributes {
        self.users.for_user(user_id)
    }

    /// Runs all three hook points for a user, as one login would.
    pub async fn issue_tokens(&self, user_id: Uuid) -> anyhow::Result<IssuedTokens> {
        let store = self.user(user_id);
        let context = MapperContext::new(REALM).with_user_attributes(&store);
        let issuer = format!("https://auth.example.com/realms/{REALM}");
        let expires_at = Utc::now() + Duration::minutes(5);

        let mut id_token = IdTokenClaims::new(
            issuer.clone(),
            user_id.to_string(),
            "test-client",
            expires_at,
        );
        self.registry
            .apply_id_token_mappers(&mut id_token, &self.mapper_configs, &context)
            .await?;

        let mut access_token = AccessTokenClaims::new(issuer, user_id.to_string(), expires_at)
            .with_azp("test-client")
            .with_scope("openid");
        self.registry
            .apply_access_token_mappers(&mut access_token, &self.mapper_configs, &context)
            .await?;

        let mut userinfo = UserInfoClaims::new(user_id.to_string());
        self.registry
            .apply_userinfo_mappers(&mut userinfo, &self.mapper_configs, &context)
            .await?;

        tracing::debug!(%user_id, "Issued tokens");

        Ok(IssuedTokens {
            id_token,
            access_token,
            userinfo,
        })
    }
}
