//! # kc-crypto
//!
//! Random value generation for protocol mappers.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod random;

pub use random::{random_alphanumeric, seeded_alphanumeric};
