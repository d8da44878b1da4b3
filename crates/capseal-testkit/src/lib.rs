//! # capseal-testkit
//!
//! Testing utilities for the capseal security core: end-to-end fixtures
//! over the Ed25519 provider and proptest generators for permits and
//! containers.

pub mod fixtures;
pub mod generators;

pub use fixtures::{corrupt_signature, TestFixture};
