//! Error types for the capseal facade.

use thiserror::Error;

use capseal_core::{Privilege, UnitId};
use capseal_permits::PermitError;
use capseal_store::StoreError;

/// Errors surfaced to the loader/verifier.
#[derive(Debug, Error)]
pub enum CbsError {
    /// A privileged operation was denied: no grant was recorded for the
    /// requestor, either because its permit was rejected or because it
    /// never carried one (or it is still pending an absent grantor).
    #[error("security violation: {requestor} denied {privilege} privilege involving {grantor}")]
    Denied {
        requestor: UnitId,
        privilege: Privilege,
        grantor: UnitId,
    },

    /// The unit handle is not registered.
    #[error("unknown unit: {0}")]
    UnknownUnit(UnitId),

    /// The trust attribute was built for a different crypto provider.
    #[error("trust attribute provider {declared:?} does not match the active provider")]
    ProviderMismatch { declared: String },

    /// The declared content digest disagrees with the digest of the
    /// supplied signable content.
    #[error("content digest mismatch: declared {declared}, computed {computed}")]
    DigestMismatch { declared: String, computed: String },

    /// Structurally invalid trust attribute.
    #[error("malformed trust attribute: {0}")]
    MalformedAttribute(String),

    /// A unit's trust attribute may only be attached once.
    #[error("trust already attached to {0}")]
    TrustAlreadyAttached(UnitId),

    /// Artifact storage failure (fatal).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Permit container consistency failure (fatal).
    #[error(transparent)]
    Permit(#[from] PermitError),
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, CbsError>;
