//! Random string generation.
//!
//! Mapper-generated attribute values are drawn from the alphanumeric
//! alphabet (a-z, A-Z, 0-9) using the thread-local generator, which is
//! cryptographically secure.

use rand::SeedableRng;
use rand::distr::{Alphanumeric, SampleString};
use rand::rngs::StdRng;

/// Generates a random alphanumeric string of exactly `len` characters.
#[must_use]
pub fn random_alphanumeric(len: usize) -> String {
    let mut rng = rand::rng();
    Alphanumeric.sample_string(&mut rng, len)
}

/// Generates a deterministic alphanumeric string from a seed (for testing only).
///
/// # Warning
///
/// The same seed always yields the same string. Never use this outside tests.
#[must_use]
pub fn seeded_alphanumeric(seed: [u8; 32], len: usize) -> String {
    let mut rng = StdRng::from_seed(seed);
    Alphanumeric.sample_string(&mut rng, len)
}
