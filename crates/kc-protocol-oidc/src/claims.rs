//! JWT claim types for OIDC tokens.
//!
//! Only the registered claims are typed; everything protocol mappers add
//! lands in the flattened `additional` map of each claim set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Access token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Issuer - URL of the authorization server.
    pub iss: String,

    /// Subject - unique identifier for the user.
    pub sub: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// JWT ID - unique identifier for the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Authorized party - client ID that requested the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,

    /// Scope - space-separated list of scopes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Token type (usually "Bearer").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Additional claims (for protocol mappers).
    #[serde(flatten)]
    pub additional: HashMap<String, serde_json::Value>,
}

impl AccessTokenClaims {
    /// Creates new access token claims.
    #[must_use]
    pub fn new(issuer: String, subject: String, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            iss: issuer,
            sub: subject,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Some(Uuid::now_v7().to_string()),
            azp: None,
            scope: None,
            typ: Some("Bearer".to_string()),
            additional: HashMap::new(),
        }
    }

    /// Sets the authorized party (client ID).
    #[must_use]
    pub fn with_azp(mut self, client_id: impl Into<String>) -> Self {
        self.azp = Some(client_id.into());
        self
    }

    /// Sets the scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// ID token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Issuer - URL of the authorization server.
    pub iss: String,

    /// Subject - unique identifier for the user.
    pub sub: String,

    /// Audience - client ID that requested the token.
    pub aud: Audience,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Nonce (required if provided in request).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Authorized party.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,

    /// Additional claims.
    #[serde(flatten)]
    pub additional: HashMap<String, serde_json::Value>,
}

impl IdTokenClaims {
    /// Creates new ID token claims.
    #[must_use]
    pub fn new(
        issuer: String,
        subject: String,
        audience: impl Into<Audience>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            iss: issuer,
            sub: subject,
            aud: audience.into(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            nonce: None,
            azp: None,
            additional: HashMap::new(),
        }
    }

    /// Sets the nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }
}

/// `UserInfo` endpoint response claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfoClaims {
    /// Subject - unique identifier for the user.
    pub sub: String,

    /// Additional claims.
    #[serde(flatten)]
    pub additional: HashMap<String, serde_json::Value>,
}

impl UserInfoClaims {
    /// Creates a userinfo response for a subject.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            sub: subject.into(),
            additional: HashMap::new(),
        }
    }
}

/// JWT audience claim (can be single string or array).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Audience {
    /// Single audience.
    Single(String),
    /// Multiple audiences.
    Multiple(Vec<String>),
}

impl From<String> for Audience {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

impl From<&str> for Audience {
    fn from(s: &str) -> Self {
        Self::Single(s.to_string())
    }
}
