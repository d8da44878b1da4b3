//! A single pending permit.

use serde::{Deserialize, Serialize};

use capseal_core::{Privilege, Signature, UnitId};

/// One pending entitlement claim: a grantor's signature over the owning
/// unit's content digest.
///
/// Invariant: `grantor` is `None` exactly for the distinguished subclass
/// permit, whose grantor is implicitly the unit's direct supertype. At most
/// one such permit exists per container, and it sits at index 0 until the
/// first removal re-orders the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit {
    grantor: Option<UnitId>,
    privilege: Privilege,
    signature: Signature,
}

impl Permit {
    /// The distinguished subclass permit (grantor is the direct supertype).
    pub fn subclass(signature: Signature) -> Self {
        Self {
            grantor: None,
            privilege: Privilege::Subclass,
            signature,
        }
    }

    /// An interface-implementation permit from an explicit grantor.
    pub fn interface(grantor: UnitId, signature: Signature) -> Self {
        Self {
            grantor: Some(grantor),
            privilege: Privilege::Interface,
            signature,
        }
    }

    /// An instantiation permit from an explicit grantor.
    pub fn instantiate(grantor: UnitId, signature: Signature) -> Self {
        Self {
            grantor: Some(grantor),
            privilege: Privilege::Instantiate,
            signature,
        }
    }

    /// The explicit grantor, or `None` for the subclass permit.
    pub fn grantor(&self) -> Option<UnitId> {
        self.grantor
    }

    /// The privilege this permit proves.
    pub fn privilege(&self) -> Privilege {
        self.privilege
    }

    /// The permit's signature artifact.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Whether this permit is discharged by the given grantor.
    ///
    /// Grantors match by identity. The subclass permit matches only when
    /// the candidate is the unit's direct supertype.
    pub fn applies_to(&self, grantor: UnitId, grantor_is_direct_supertype: bool) -> bool {
        match self.grantor {
            Some(g) => g == grantor,
            None => grantor_is_direct_supertype,
        }
    }
}
