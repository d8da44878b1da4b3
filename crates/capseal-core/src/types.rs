//! Strong type definitions for the capseal security core.
//!
//! Identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity handle for a loaded program unit.
///
/// Handles are assigned by the registry when a unit is registered and are
/// never reused within a runtime. Permits name their grantor by this
/// identity, not by structural equality of any unit content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl UnitId {
    /// Create a UnitId from a raw handle value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw handle value.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// The privileged relationship a permit proves.
///
/// Each permit is independently sufficient proof of exactly one privilege;
/// no privilege depends on the discharge order of any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Privilege {
    /// Subclassing a protected type (the distinguished grantor-less permit;
    /// the grantor is implicitly the direct supertype).
    Subclass,

    /// Implementing a protected interface.
    Interface,

    /// Instantiating a protected type.
    Instantiate,
}

impl Privilege {
    /// The fixed lowercase name used in denial diagnostics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Privilege::Subclass => "subclass",
            Privilege::Interface => "interface",
            Privilege::Instantiate => "instantiate",
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
