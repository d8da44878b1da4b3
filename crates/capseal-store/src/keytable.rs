//! Grantor key table.
//!
//! Maps a protected unit's identity to its declared public key encoding.
//! An ordinary map replaces the historical intrusive chain field on the key
//! entity; the key blob itself stays a plain leaf artifact.

use std::collections::HashMap;

use capseal_core::{EncodedKey, UnitId};

/// Associative index from unit identity to declared key encoding.
///
/// A unit present in the table is a *protected* unit: it can grant permits,
/// and privileged relationships with it require proof.
#[derive(Debug, Default)]
pub struct KeyTable {
    keys: HashMap<UnitId, EncodedKey>,
}

impl KeyTable {
    /// Create an empty key table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or replace) a unit's key encoding.
    pub fn declare(&mut self, unit: UnitId, key: EncodedKey) {
        self.keys.insert(unit, key);
    }

    /// Look up a unit's declared key encoding.
    pub fn get(&self, unit: UnitId) -> Option<&EncodedKey> {
        self.keys.get(&unit)
    }

    /// Whether a unit has declared a key (i.e. is protected).
    pub fn contains(&self, unit: UnitId) -> bool {
        self.keys.contains_key(&unit)
    }

    /// Number of declared keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
