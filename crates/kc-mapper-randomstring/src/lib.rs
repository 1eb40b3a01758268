//! # kc-mapper-randomstring
//!
//! OIDC protocol mapper that gives every user a stable random string claim.
//!
//! On the first token issued for a user, the mapper generates an alphanumeric
//! string, stores it in a configurable user attribute and emits it as a
//! claim. Later tokens reuse the stored value; it is never regenerated while
//! the attribute exists.
//!
//! ## Configuration
//!
//! | Key | Default | Meaning |
//! |-----|---------|---------|
//! | `userAttribute` | `randomString` | Attribute holding the value |
//! | `stringLength` | `32` | Length of generated values, at most 4096 |
//!
//! The standard claim keys (`claim.name`, `jsonType.label`, `multivalued`,
//! `id.token.claim`, `access.token.claim`, `userinfo.token.claim`) control
//! where the value is emitted.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut registry = ProtocolMapperRegistry::new();
//! kc_mapper_randomstring::register(&mut registry);
//! ```

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod mapper;
pub mod provisioner;

pub use config::{MAX_STRING_LENGTH, RandomStringConfig};
pub use error::{ProvisionError, ProvisionResult};
pub use mapper::{PROVIDER_ID, RandomStringMapper, register, register_mapper};
pub use provisioner::ClaimProvisioner;
