//! # kc-storage
//!
//! User attribute storage for protocol mappers.
//!
//! Mappers read and write user attributes through [`UserAttributeStore`],
//! a store scoped to a single user. Persistent backends implement the trait;
//! [`InMemoryUserAttributes`] is the in-process implementation.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod attribute;
pub mod error;
pub mod memory;

pub use attribute::UserAttributeStore;
pub use error::{StorageError, StorageResult};
pub use memory::{InMemoryAttributeProvider, InMemoryUserAttributes};
