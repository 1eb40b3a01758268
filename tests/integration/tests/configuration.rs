//! Mapper configuration integration tests.

use kc_mapper_randomstring::PROVIDER_ID;
use kc_protocol_oidc::mapper::keys;
use kc_protocol_oidc::{MapperConfig, OidcError, TokenType};
use kc_storage::UserAttributeStore;
use uuid::Uuid;

use crate::common::TestEnv;

/// The registry exposes the mapper on exactly the three hook points.
#[tokio::test]
async fn test_mapper_is_registered_on_all_hook_points() -> anyhow::Result<()> {
    let env = TestEnv::new(Vec::new())?;

    let mapper = env.registry.get(PROVIDER_ID).expect("mapper registered");
    assert_eq!(mapper.display_name(), "Random String Mapper");
    assert_eq!(
        env.registry.hook_points(PROVIDER_ID),
        vec![TokenType::IdToken, TokenType::AccessToken, TokenType::UserInfo]
    );

    let names: Vec<_> = mapper
        .config_properties()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert!(names.contains(&"userAttribute".to_string()));
    assert!(names.contains(&"stringLength".to_string()));
    assert!(names.contains(&keys::CLAIM_NAME.to_string()));
    Ok(())
}

/// Misconfigured lengths are rejected when the mapper is configured.
#[tokio::test]
async fn test_invalid_length_rejected_at_configuration() -> anyhow::Result<()> {
    for raw in ["abc", "0", "-1"] {
        let config = MapperConfig::new("random", PROVIDER_ID)
            .with_config(keys::CLAIM_NAME, "random")
            .with_config("stringLength", raw);

        let result = TestEnv::new(vec![config]);
        let err = result.err().expect("configuration rejected");
        assert!(
            matches!(
                err.downcast_ref::<OidcError>(),
                Some(OidcError::InvalidConfiguration(_))
            ),
            "{raw:?} should be rejected"
        );
    }
    Ok(())
}

/// A misconfiguration that slipped past validation fails issuance without
/// touching the user.
#[tokio::test]
async fn test_invalid_length_fails_issuance_without_mutation() -> anyhow::Result<()> {
    let mut env = TestEnv::new(Vec::new())?;
    env.mapper_configs.push(
        MapperConfig::new("random", PROVIDER_ID)
            .with_config(keys::CLAIM_NAME, "random")
            .with_config("stringLength", "abc"),
    );
    let user_id = Uuid::now_v7();

    let result = env.issue_tokens(user_id).await;

    let err = result.err().expect("issuance fails");
    assert!(matches!(
        err.downcast_ref::<OidcError>(),
        Some(OidcError::InvalidConfiguration(_))
    ));
    assert!(!env.user(user_id).has("randomString").await?);
    Ok(())
}

/// Two mappers with different attributes provision independently.
#[tokio::test]
async fn test_multiple_mapper_instances() -> anyhow::Result<()> {
    let short = MapperConfig::new("short", PROVIDER_ID)
        .with_config(keys::CLAIM_NAME, "short")
        .with_config("userAttribute", "shortRandom")
        .with_config("stringLength", "4");
    let long = MapperConfig::new("long", PROVIDER_ID)
        .with_config(keys::CLAIM_NAME, "long")
        .with_config("userAttribute", "longRandom")
        .with_config("stringLength", "64");
    let env = TestEnv::new(vec![short, long])?;
    let user_id = Uuid::now_v7();

    let tokens = env.issue_tokens(user_id).await?;

    let short = tokens.access_token.additional["short"].as_str().unwrap_or_default();
    let long = tokens.access_token.additional["long"].as_str().unwrap_or_default();
    assert_eq!(short.len(), 4);
    assert_eq!(long.len(), 64);
    assert!(env.user(user_id).has("shortRandom").await?);
    assert!(env.user(user_id).has("longRandom").await?);
    Ok(())
}
