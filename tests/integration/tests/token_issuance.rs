//! Token issuance integration tests.

use kc_mapper_randomstring::PROVIDER_ID;
use kc_protocol_oidc::MapperConfig;
use kc_protocol_oidc::mapper::keys;
use kc_storage::UserAttributeStore;
use serde_json::Value;
use uuid::Uuid;

use crate::common::TestEnv;

fn random_string_mapper(claim_name: &str) -> MapperConfig {
    MapperConfig::new("random string", PROVIDER_ID).with_config(keys::CLAIM_NAME, claim_name)
}

fn claim_str(claims: &std::collections::HashMap<String, Value>, name: &str) -> Option<String> {
    claims.get(name).and_then(Value::as_str).map(str::to_string)
}

/// First login provisions the attribute and emits it in every token.
#[tokio::test]
async fn test_first_login_provisions_random_string() -> anyhow::Result<()> {
    let env = TestEnv::new(vec![random_string_mapper("random")])?;
    let user_id = Uuid::now_v7();

    let tokens = env.issue_tokens(user_id).await?;

    let stored = env
        .user(user_id)
        .get("randomString")
        .await?
        .expect("attribute provisioned");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].len(), 32);
    assert!(stored[0].chars().all(|c| c.is_ascii_alphanumeric()));

    assert_eq!(claim_str(&tokens.id_token.additional, "random"), Some(stored[0].clone()));
    assert_eq!(claim_str(&tokens.access_token.additional, "random"), Some(stored[0].clone()));
    assert_eq!(claim_str(&tokens.userinfo.additional, "random"), Some(stored[0].clone()));
    Ok(())
}

/// Later logins reuse the stored value.
#[tokio::test]
async fn test_value_is_stable_across_logins() -> anyhow::Result<()> {
    let env = TestEnv::new(vec![random_string_mapper("random")])?;
    let user_id = Uuid::now_v7();

    let first = env.issue_tokens(user_id).await?;
    for _ in 0..5 {
        let again = env.issue_tokens(user_id).await?;
        assert_eq!(
            again.access_token.additional.get("random"),
            first.access_token.additional.get("random")
        );
    }
    Ok(())
}

/// Each user gets their own value.
#[tokio::test]
async fn test_users_get_distinct_values() -> anyhow::Result<()> {
    let env = TestEnv::new(vec![random_string_mapper("random")])?;

    let alice = env.issue_tokens(Uuid::now_v7()).await?;
    let bob = env.issue_tokens(Uuid::now_v7()).await?;

    assert_ne!(
        alice.id_token.additional.get("random"),
        bob.id_token.additional.get("random")
    );
    Ok(())
}

/// A pre-existing attribute is emitted untouched.
#[tokio::test]
async fn test_existing_attribute_is_not_overwritten() -> anyhow::Result<()> {
    let config = random_string_mapper("badge")
        .with_config("userAttribute", "badge")
        .with_config("stringLength", "8");
    let env = TestEnv::new(vec![config])?;
    let user_id = Uuid::now_v7();
    env.user(user_id)
        .set("badge", vec!["ABCDE123".to_string()])
        .await?;

    let tokens = env.issue_tokens(user_id).await?;

    assert_eq!(
        claim_str(&tokens.access_token.additional, "badge"),
        Some("ABCDE123".to_string())
    );
    assert_eq!(
        env.user(user_id).get("badge").await?,
        Some(vec!["ABCDE123".to_string()])
    );
    Ok(())
}

/// An administrative reset triggers regeneration on the next login.
#[tokio::test]
async fn test_reset_attribute_is_regenerated() -> anyhow::Result<()> {
    let env = TestEnv::new(vec![random_string_mapper("random")])?;
    let user_id = Uuid::now_v7();

    let before = env.issue_tokens(user_id).await?;
    env.user(user_id).remove("randomString").await?;
    let after = env.issue_tokens(user_id).await?;

    let before = claim_str(&before.access_token.additional, "random");
    let after = claim_str(&after.access_token.additional, "random");
    assert!(after.is_some());
    assert_ne!(before, after);
    Ok(())
}

/// Hook switches decide which tokens carry the claim; provisioning still happens.
#[tokio::test]
async fn test_hook_switches_limit_claim_placement() -> anyhow::Result<()> {
    let config = random_string_mapper("random")
        .with_config(keys::ACCESS_TOKEN_CLAIM, "false")
        .with_config(keys::USERINFO_TOKEN_CLAIM, "false");
    let env = TestEnv::new(vec![config])?;
    let user_id = Uuid::now_v7();

    let tokens = env.issue_tokens(user_id).await?;

    assert!(tokens.id_token.additional.contains_key("random"));
    assert!(!tokens.access_token.additional.contains_key("random"));
    assert!(!tokens.userinfo.additional.contains_key("random"));
    Ok(())
}

/// Multivalued mappings emit the stored values as an array.
#[tokio::test]
async fn test_multivalued_claim() -> anyhow::Result<()> {
    let config = random_string_mapper("ext.random").with_config(keys::MULTIVALUED, "true");
    let env = TestEnv::new(vec![config])?;
    let user_id = Uuid::now_v7();

    let tokens = env.issue_tokens(user_id).await?;

    let stored = env.user(user_id).get("randomString").await?.unwrap_or_default();
    assert_eq!(
        tokens.userinfo.additional.get("ext"),
        Some(&serde_json::json!({ "random": stored }))
    );
    Ok(())
}

/// Parallel first logins for one user agree on a single value.
#[tokio::test]
async fn test_parallel_first_logins_converge() -> anyhow::Result<()> {
    let env = std::sync::Arc::new(TestEnv::new(vec![random_string_mapper("random")])?);
    let user_id = Uuid::now_v7();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let env = std::sync::Arc::clone(&env);
            tokio::spawn(async move { env.issue_tokens(user_id).await })
        })
        .collect();

    let mut claims = Vec::new();
    for handle in handles {
        let tokens = handle.await??;
        claims.push(claim_str(&tokens.access_token.additional, "random"));
    }

    let stored = env.user(user_id).get("randomString").await?;
    assert_eq!(stored.as_ref().map(Vec::len), Some(1));
    let value = stored.and_then(|v| v.into_iter().next());
    assert!(claims.iter().all(|c| *c == value));
    Ok(())
}
