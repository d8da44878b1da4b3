//! # capseal
//!
//! Capability-based security for a constrained managed-code runtime.
//!
//! ## Overview
//!
//! A loaded program unit proves its right to a privileged relationship
//! (subclassing a protected type, implementing a protected interface,
//! instantiating a protected type) with a *permit*: the privileged unit's
//! owner signs, offline, a digest of the requestor's binary content. The
//! runtime cannot always verify a permit at load time because the grantor's
//! key may not be loaded yet, so permits stay pending until discharge.
//!
//! ## Key concepts
//!
//! - **TrustAttribute**: the decoded trust block from a unit's class file
//! - **Registry**: tracks units, grantor keys, pending permits, and grants
//! - **Discharge**: resolving pending permits once the grantor is loaded
//! - **Authorization**: denying a privileged operation whose permit was
//!   rejected or never presented
//!
//! ## Usage
//!
//! ```rust,no_run
//! use capseal::{Registry, TrustAttribute};
//! use capseal_core::{Ed25519Provider, Keypair, PROVIDER_IDENTITY};
//!
//! let mut registry = Registry::new(Ed25519Provider::new());
//!
//! // The protected grantor and the requestor.
//! let grantor = registry.register("com.vendor.SecureChannel");
//! let requestor = registry.register("com.app.Client");
//!
//! // Offline: the grantor's owner signs the requestor's content digest.
//! let owner = Keypair::generate();
//! let content = b"requestor class bytes";
//! let digest = registry.provider().digest_content(content);
//! # use capseal_core::CryptoProvider;
//! let attr = TrustAttribute::builder(PROVIDER_IDENTITY, digest.clone())
//!     .instantiate(grantor, owner.sign_digest(&digest))
//!     .build();
//!
//! registry.declare_key(grantor, &owner.encoded_public_key()).unwrap();
//! registry.attach_trust(requestor, &attr, content).unwrap();
//! let report = registry.mark_loaded(grantor).unwrap();
//! assert!(report.is_clean());
//! registry.authorize_instantiation(requestor, grantor).unwrap();
//! ```

pub mod attribute;
pub mod error;
pub mod registry;
pub mod unit;

pub use attribute::{PermitEntry, TrustAttribute, TrustAttributeBuilder};
pub use error::{CbsError, Result};
pub use registry::{DischargeReport, Registry};
pub use unit::{GrantedPrivileges, LoadedUnit, UnitState};

// Re-export the crates the facade's API surfaces.
pub use capseal_core as core;
pub use capseal_permits as permits;
pub use capseal_store as store;
