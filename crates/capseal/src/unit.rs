//! Per-unit runtime records.

use std::collections::HashSet;

use capseal_core::{CryptoError, CryptoProvider, UnitId};
use capseal_permits::PendingPermits;

/// Lifecycle state of a registered unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// Known to the loader; its key cannot yet discharge permits.
    Registered,

    /// Fully loaded; discharge against it has been triggered.
    Loaded,
}

/// Privileges already proven by discharged permits.
///
/// A grant is unconditional and can never be revoked, so a plain cache is
/// sufficient: once recorded here the corresponding permit is gone from the
/// container.
#[derive(Debug, Default)]
pub struct GrantedPrivileges {
    /// Subclassing the direct supertype is allowed.
    pub subclass: bool,

    /// Protected interfaces this unit may implement.
    pub interfaces: HashSet<UnitId>,

    /// Protected types this unit may instantiate.
    pub instantiations: HashSet<UnitId>,
}

/// One registered unit.
///
/// The unit exclusively owns its pending container; the artifacts inside it
/// are shared store references. The decoded-key slot caches the provider's
/// decode result for this unit acting as a grantor, including a failed
/// decode, so one malformed key rejects every permit that names it without
/// re-decoding.
pub struct LoadedUnit<P: CryptoProvider> {
    pub(crate) id: UnitId,
    pub(crate) name: String,
    pub(crate) supertype: Option<UnitId>,
    pub(crate) state: UnitState,
    pub(crate) trust_attached: bool,
    pub(crate) pending: Option<PendingPermits>,
    pub(crate) decoded_key: Option<Result<P::PublicKey, CryptoError>>,
    pub(crate) granted: GrantedPrivileges,
}

impl<P: CryptoProvider> LoadedUnit<P> {
    pub(crate) fn new(id: UnitId, name: String) -> Self {
        Self {
            id,
            name,
            supertype: None,
            state: UnitState::Registered,
            trust_attached: false,
            pending: None,
            decoded_key: None,
            granted: GrantedPrivileges::default(),
        }
    }

    /// The unit's identity handle.
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// The loader-supplied unit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The direct supertype, if one was declared.
    pub fn supertype(&self) -> Option<UnitId> {
        self.supertype
    }

    /// Current lifecycle state.
    pub fn state(&self) -> UnitState {
        self.state
    }

    /// The pending permit container, while any permits remain.
    pub fn pending(&self) -> Option<&PendingPermits> {
        self.pending.as_ref()
    }

    /// Privileges proven so far.
    pub fn granted(&self) -> &GrantedPrivileges {
        &self.granted
    }
}

impl<P: CryptoProvider> std::fmt::Debug for LoadedUnit<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedUnit")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("pending", &self.pending.as_ref().map(|p| p.len()))
            .finish()
    }
}
