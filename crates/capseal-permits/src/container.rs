//! The pending permit container.
//!
//! A per-unit, fixed-capacity, compacting array of permits plus the digest
//! of the unit's signable content. Sized exactly once, at creation, to the
//! permit count the unit's trust attribute declares; it never grows.
//!
//! Load-time ordering is `[subclass permit?] [interface permits...]
//! [instantiation permits...]`. The ordering is a scan-locality hint only:
//! removal swaps the last live permit into the vacated slot, so no consumer
//! may rely on order once discharge begins.

use serde::{Deserialize, Serialize};

use capseal_core::{Digest, Privilege, Signature};

use crate::error::{PermitError, Result};
use crate::permit::Permit;

/// Pending permits attached to one loaded unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPermits {
    digest: Digest,
    /// Interface permits counted at load time. Not maintained after the
    /// first removal; post-mutation it is bookkeeping only.
    interface_permit_count: usize,
    capacity: usize,
    permits: Vec<Permit>,
}

impl PendingPermits {
    /// Create a container sized to exactly `capacity` permits.
    ///
    /// All permits for a unit must be known before creation; the backing
    /// storage never reallocates.
    pub fn new(digest: Digest, capacity: usize) -> Self {
        Self {
            digest,
            interface_permit_count: 0,
            capacity,
            permits: Vec::with_capacity(capacity),
        }
    }

    /// The digest of the owning unit's signable content.
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Live permit count.
    pub fn len(&self) -> usize {
        self.permits.len()
    }

    /// Whether the container holds no live permits.
    ///
    /// Transient only: the last removal returns `None` instead of leaving
    /// an empty container behind.
    pub fn is_empty(&self) -> bool {
        self.permits.is_empty()
    }

    /// The fixed capacity chosen at creation.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Interface permits recorded during loading.
    pub fn interface_permit_count(&self) -> usize {
        self.interface_permit_count
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<()> {
        #[cfg(not(feature = "unchecked-indexing"))]
        if index >= self.permits.len() {
            return Err(PermitError::IndexOutOfRange {
                index,
                len: self.permits.len(),
            });
        }
        #[cfg(feature = "unchecked-indexing")]
        debug_assert!(
            index < self.permits.len(),
            "permit index {index} out of range for container of {}",
            self.permits.len()
        );
        Ok(())
    }

    /// Random access to a live permit.
    pub fn at(&self, index: usize) -> Result<&Permit> {
        self.check_index(index)?;
        Ok(&self.permits[index])
    }

    /// Append a permit during initial population, returning its index.
    ///
    /// `is_interface` maintains the load-time interface permit count.
    /// Filling past the fixed capacity is an internal-consistency failure:
    /// the loader declared one count and supplied another.
    pub fn add(&mut self, permit: Permit, is_interface: bool) -> Result<usize> {
        if self.permits.len() == self.capacity {
            return Err(PermitError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        debug_assert_eq!(is_interface, permit.privilege() == Privilege::Interface);
        let index = self.permits.len();
        self.permits.push(permit);
        if is_interface {
            self.interface_permit_count += 1;
        }
        Ok(index)
    }

    /// Remove the permit at `index` by swapping the last live permit into
    /// its slot.
    ///
    /// Returns `None` when the last permit is removed: the caller discards
    /// the whole container rather than keeping a zero-sized one.
    pub fn remove(mut self, index: usize) -> Result<Option<Self>> {
        self.check_index(index)?;
        self.permits.swap_remove(index);
        if self.permits.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self))
        }
    }

    /// Iterate over exactly the live permits.
    ///
    /// Lazy, finite, restartable. Mutation during iteration is not
    /// possible through this API; callers that remove based on a scan must
    /// collect indices first and apply removals in descending index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Permit> {
        self.permits.iter()
    }

    /// The live permits' signatures, usable as an interning scope.
    pub fn signatures(&self) -> impl Iterator<Item = &Signature> {
        self.permits.iter().map(Permit::signature)
    }
}

impl<'a> IntoIterator for &'a PendingPermits {
    type Item = &'a Permit;
    type IntoIter = std::slice::Iter<'a, Permit>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
