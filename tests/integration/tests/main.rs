//! End-to-End Integration Tests
//!
//! These tests drive the random string mapper through the protocol mapper
//! registry the way the token pipeline does, against in-memory user storage.

mod common;
mod configuration;
mod token_issuance;
