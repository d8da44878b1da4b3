//! # capseal-core
//!
//! Core primitives for the capseal capability-based security layer:
//!
//! - Strong identifiers ([`UnitId`], [`Privilege`])
//! - Artifact blobs ([`Digest`], [`Signature`], [`EncodedKey`])
//! - The crypto provider boundary ([`CryptoProvider`], [`CryptoError`])
//! - A concrete Ed25519/Blake3 provider ([`Ed25519Provider`])
//!
//! Everything here is synchronous and allocation-light; the container and
//! discharge machinery live in `capseal-permits`, interning in
//! `capseal-store`.

pub mod artifact;
pub mod ed25519;
pub mod error;
pub mod provider;
pub mod types;

pub use artifact::{Digest, EncodedKey, Signature};
pub use ed25519::{Ed25519Provider, Keypair, PROVIDER_IDENTITY};
pub use error::CryptoError;
pub use provider::CryptoProvider;
pub use types::{Privilege, UnitId};
