//! # capseal-store
//!
//! Artifact storage for the capseal security core:
//!
//! - [`ArtifactStore`]: interning cache for digest, signature, and key
//!   blobs, with an optional byte budget whose exhaustion is fatal.
//! - [`KeyTable`]: the external associative index from protected units to
//!   their declared public key encodings.
//!
//! Artifacts are immutable and shared by reference; nothing here is ever
//! freed individually.

pub mod error;
pub mod intern;
pub mod keytable;

pub use error::{Result, StoreError};
pub use intern::ArtifactStore;
pub use keytable::KeyTable;
