//! Interning ("hash-consing") store for cryptographic artifacts.
//!
//! Many units carry structurally identical signatures (a grantor signing a
//! family of requestors reuses key material, and a unit's own permits often
//! repeat bytes). Interning bounds memory by returning a shared reference to
//! an existing blob when an equal one already exists in a caller-supplied
//! search scope.
//!
//! The scope is deliberately narrow: only signatures already attached to an
//! adjacent container are scanned. There is no global signature index; with
//! no scope the store always allocates. Digests and keys are never
//! deduplicated.

use capseal_core::{Digest, EncodedKey, Signature};

use crate::error::{Result, StoreError};

/// Allocation-accounting interning store for digest, signature, and key
/// blobs.
///
/// Blobs are immutable once allocated and live for the life of the store;
/// there is no free operation. An optional byte budget models the fixed
/// artifact backing storage of the runtime: exceeding it is a fatal error to
/// the caller, not a soft degradation.
#[derive(Debug)]
pub struct ArtifactStore {
    budget: Option<usize>,
    used: usize,
}

impl ArtifactStore {
    /// Create a store with no byte budget.
    pub fn new() -> Self {
        Self {
            budget: None,
            used: 0,
        }
    }

    /// Create a store that refuses to allocate past `limit` total bytes.
    pub fn with_byte_budget(limit: usize) -> Self {
        Self {
            budget: Some(limit),
            used: 0,
        }
    }

    /// Total bytes allocated so far.
    pub fn bytes_used(&self) -> usize {
        self.used
    }

    fn charge(&mut self, requested: usize) -> Result<()> {
        if let Some(limit) = self.budget {
            let remaining = limit - self.used;
            if requested > remaining {
                return Err(StoreError::Exhausted {
                    requested,
                    remaining,
                });
            }
        }
        self.used += requested;
        Ok(())
    }

    /// Intern a signature blob against a search scope.
    ///
    /// Scans `scope` for a live signature with exact length and byte
    /// equality and returns a shared clone of the first match; otherwise
    /// allocates a new immutable blob. An empty scope always allocates.
    pub fn intern_signature<'a, I>(&mut self, scope: I, bytes: &[u8]) -> Result<Signature>
    where
        I: IntoIterator<Item = &'a Signature>,
    {
        for existing in scope {
            if matches_blob(existing.as_bytes(), bytes) {
                return Ok(existing.clone());
            }
        }
        self.charge(bytes.len())?;
        Ok(Signature::from_bytes(bytes))
    }

    /// Intern a content digest. Always allocates.
    pub fn intern_digest(&mut self, bytes: &[u8]) -> Result<Digest> {
        self.charge(bytes.len())?;
        Ok(Digest::from_bytes(bytes))
    }

    /// Intern an encoded public key. Always allocates.
    pub fn intern_key(&mut self, bytes: &[u8]) -> Result<EncodedKey> {
        self.charge(bytes.len())?;
        Ok(EncodedKey::from_bytes(bytes))
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Exact length + byte equality, with a first-byte fast path.
///
/// The fast path is an optimization only; full comparison decides.
#[inline]
fn matches_blob(existing: &[u8], candidate: &[u8]) -> bool {
    if existing.len() != candidate.len() {
        return false;
    }
    match (existing.first(), candidate.first()) {
        (Some(a), Some(b)) if a != b => false,
        _ => existing == candidate,
    }
}
