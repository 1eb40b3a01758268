//! # kc-protocol-oidc
//!
//! `OpenID` Connect protocol mapper SPI.
//!
//! Protocol mappers add claims to ID tokens, access tokens and userinfo
//! responses while they are issued. This crate defines the mapper traits,
//! their configuration model, the registry the token pipeline dispatches
//! through, and the claim types mappers write into.
//!
//! ## Modules
//!
//! - [`claims`] - JWT claim types for access tokens, ID tokens and userinfo
//! - [`error`] - OIDC error types
//! - [`mapper`] - Protocol mapper traits, configuration and registry

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod claims;
pub mod error;
pub mod mapper;

// Re-export commonly used types
pub use claims::{AccessTokenClaims, Audience, IdTokenClaims, UserInfoClaims};
pub use error::{OidcError, OidcResult};
pub use mapper::{
    AccessTokenMapper, ClaimValueType, ConfigProperty, ConfigPropertyType, IdTokenMapper,
    MapperConfig, MapperContext, ProtocolMapper, ProtocolMapperRegistry, TokenType,
    UserInfoMapper, attribute_claim_properties, map_claim,
};
