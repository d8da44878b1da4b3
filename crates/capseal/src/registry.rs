//! The unit registry: loader/verifier integration for the security core.
//!
//! The registry ties the pieces together. The loader registers units,
//! declares grantor keys, and attaches trust attributes while parsing class
//! files; when a grantor transitions to the loaded state the registry
//! discharges every pending permit naming it; the verifier asks the
//! authorization methods before allowing a privileged operation.

use std::collections::HashMap;

use capseal_core::{CryptoError, CryptoProvider, Privilege, UnitId};
use capseal_permits::{discharge, DischargeOutcome, Permit, PendingPermits, Verdict};
use capseal_store::{ArtifactStore, KeyTable};

use crate::attribute::TrustAttribute;
use crate::error::{CbsError, Result};
use crate::unit::{LoadedUnit, UnitState};

/// Aggregated result of one discharge pass.
///
/// A rejection here is not an error: the grantor loaded fine, the permit
/// merely failed to prove its privilege. The denial itself surfaces later,
/// from the authorization methods, naming the specific privilege.
#[derive(Debug, Default)]
pub struct DischargeReport {
    /// Permits that verified; their privileges are now held.
    pub granted: Vec<DischargeOutcome>,

    /// Permits that failed to decode or verify.
    pub rejected: Vec<DischargeOutcome>,
}

impl DischargeReport {
    /// Whether no permit was rejected.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Total permits resolved in this pass.
    pub fn total(&self) -> usize {
        self.granted.len() + self.rejected.len()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: DischargeReport) {
        self.granted.extend(other.granted);
        self.rejected.extend(other.rejected);
    }

    fn record(&mut self, outcome: DischargeOutcome) {
        if outcome.verdict.is_granted() {
            self.granted.push(outcome);
        } else {
            self.rejected.push(outcome);
        }
    }
}

/// The capability-based security registry.
///
/// Single-turn execution is assumed throughout: class loading and discharge
/// run synchronously to completion, so no internal locking is needed.
pub struct Registry<P: CryptoProvider> {
    provider: P,
    store: ArtifactStore,
    keys: KeyTable,
    units: HashMap<UnitId, LoadedUnit<P>>,
    /// Grantor -> requestors that hold pending permits naming it.
    requestors: HashMap<UnitId, Vec<UnitId>>,
    next_id: u32,
}

impl<P: CryptoProvider> Registry<P> {
    /// Create a registry over the given provider with an unbounded store.
    pub fn new(provider: P) -> Self {
        Self::with_store(provider, ArtifactStore::new())
    }

    /// Create a registry with a caller-configured artifact store.
    pub fn with_store(provider: P, store: ArtifactStore) -> Self {
        Self {
            provider,
            store,
            keys: KeyTable::new(),
            units: HashMap::new(),
            requestors: HashMap::new(),
            next_id: 0,
        }
    }

    /// The active crypto provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The artifact store.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// The grantor key table.
    pub fn key_table(&self) -> &KeyTable {
        &self.keys
    }

    /// Look up a registered unit.
    pub fn unit(&self, id: UnitId) -> Result<&LoadedUnit<P>> {
        self.units.get(&id).ok_or(CbsError::UnknownUnit(id))
    }

    fn unit_mut(&mut self, id: UnitId) -> Result<&mut LoadedUnit<P>> {
        self.units.get_mut(&id).ok_or(CbsError::UnknownUnit(id))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────

    /// Register a new unit, returning its identity handle.
    pub fn register(&mut self, name: &str) -> UnitId {
        self.next_id += 1;
        let id = UnitId::from_raw(self.next_id);
        self.units.insert(id, LoadedUnit::new(id, name.to_string()));
        id
    }

    /// Declare a unit's direct supertype.
    ///
    /// Must precede [`attach_trust`](Self::attach_trust) when the attribute
    /// carries a subclass permit, since that permit's grantor is implicit.
    pub fn set_supertype(&mut self, unit: UnitId, supertype: UnitId) -> Result<()> {
        if !self.units.contains_key(&supertype) {
            return Err(CbsError::UnknownUnit(supertype));
        }
        self.unit_mut(unit)?.supertype = Some(supertype);
        Ok(())
    }

    /// Declare a unit's public key encoding, marking it protected.
    pub fn declare_key(&mut self, unit: UnitId, encoded: &[u8]) -> Result<()> {
        if !self.units.contains_key(&unit) {
            return Err(CbsError::UnknownUnit(unit));
        }
        let key = self.store.intern_key(encoded)?;
        self.keys.declare(unit, key);
        Ok(())
    }

    /// Attach a unit's trust attribute, populating its pending container.
    ///
    /// Validates the attribute, interns its artifacts, builds the container
    /// in the canonical `[subclass][interfaces][instantiations]` order, and
    /// links it to the unit in a single assignment. Permits whose grantor
    /// is already loaded are discharged immediately; the rest wait for
    /// [`mark_loaded`](Self::mark_loaded).
    pub fn attach_trust(
        &mut self,
        unit: UnitId,
        attr: &TrustAttribute,
        signable_content: &[u8],
    ) -> Result<DischargeReport> {
        let supertype = {
            let record = self.unit(unit)?;
            if record.trust_attached {
                return Err(CbsError::TrustAlreadyAttached(unit));
            }
            record.supertype
        };

        if !self.provider.verify_provider_identity(attr.provider.as_bytes()) {
            return Err(CbsError::ProviderMismatch {
                declared: attr.provider.clone(),
            });
        }
        if attr.interface_permit_count > attr.permits.len() {
            return Err(CbsError::MalformedAttribute(format!(
                "interface permit count {} exceeds permit count {}",
                attr.interface_permit_count,
                attr.permits.len()
            )));
        }
        if attr.total_permits() == 0 {
            return Err(CbsError::MalformedAttribute(
                "attribute declares no permits".to_string(),
            ));
        }
        if attr.subclass_signature.is_some() && supertype.is_none() {
            return Err(CbsError::MalformedAttribute(
                "subclass permit requires a declared supertype".to_string(),
            ));
        }

        // The digest is recomputed over the supplied content; a unit cannot
        // claim a digest its bytes do not hash to.
        let computed = self.provider.digest_content(signable_content);
        if computed != attr.digest {
            return Err(CbsError::DigestMismatch {
                declared: hex::encode(&attr.digest),
                computed: hex::encode(&computed),
            });
        }

        // Build the container fully before linking it to the unit, then
        // attach with one assignment.
        let digest = self.store.intern_digest(&attr.digest)?;
        let mut container = PendingPermits::new(digest, attr.total_permits());

        if let Some(sig_bytes) = &attr.subclass_signature {
            let sig = self.store.intern_signature(container.signatures(), sig_bytes)?;
            container.add(Permit::subclass(sig), false)?;
        }
        for (i, entry) in attr.permits.iter().enumerate() {
            let is_interface = i < attr.interface_permit_count;
            let sig = self
                .store
                .intern_signature(container.signatures(), &entry.signature)?;
            let permit = if is_interface {
                Permit::interface(entry.grantor, sig)
            } else {
                Permit::instantiate(entry.grantor, sig)
            };
            container.add(permit, is_interface)?;
        }

        let record = self.unit_mut(unit)?;
        record.pending = Some(container);
        record.trust_attached = true;

        // Index this requestor under each grantor that is not yet loaded;
        // discharge immediately against the ones that are.
        let mut grantors: Vec<UnitId> = attr.permits.iter().map(|e| e.grantor).collect();
        if attr.subclass_signature.is_some() {
            if let Some(sup) = supertype {
                grantors.push(sup);
            }
        }
        grantors.sort_unstable();
        grantors.dedup();

        let mut report = DischargeReport::default();
        for grantor in grantors {
            let loaded = self
                .units
                .get(&grantor)
                .is_some_and(|u| u.state == UnitState::Loaded);
            if loaded {
                report.merge(self.discharge_pair(unit, grantor)?);
            } else {
                let entry = self.requestors.entry(grantor).or_default();
                if !entry.contains(&unit) {
                    entry.push(unit);
                }
            }
        }
        Ok(report)
    }

    /// Transition a unit to the loaded state and discharge every pending
    /// permit that names it as grantor.
    pub fn mark_loaded(&mut self, unit: UnitId) -> Result<DischargeReport> {
        self.unit_mut(unit)?.state = UnitState::Loaded;

        let mut report = DischargeReport::default();
        if let Some(waiting) = self.requestors.remove(&unit) {
            for requestor in waiting {
                report.merge(self.discharge_pair(requestor, unit)?);
            }
        }
        Ok(report)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Discharge
    // ─────────────────────────────────────────────────────────────────────

    /// The grantor's cached key-decode result, decoding on first use.
    ///
    /// A failed decode is cached too: a malformed key rejects every permit
    /// naming the grantor, now and later, without re-decoding.
    fn grantor_key(&mut self, grantor: UnitId) -> Result<std::result::Result<P::PublicKey, CryptoError>> {
        if let Some(cached) = &self.unit(grantor)?.decoded_key {
            return Ok(cached.clone());
        }

        let decoded = match self.keys.get(grantor) {
            Some(encoded) => self.provider.decode_public_key(encoded.as_bytes()),
            None => {
                tracing::warn!(%grantor, "permits name a grantor with no declared key");
                Err(CryptoError::InvalidEncoding)
            }
        };
        self.unit_mut(grantor)?.decoded_key = Some(decoded.clone());
        Ok(decoded)
    }

    /// Discharge one requestor's permits against one grantor.
    fn discharge_pair(&mut self, requestor: UnitId, grantor: UnitId) -> Result<DischargeReport> {
        let key = self.grantor_key(grantor)?;
        let is_supertype = self.unit(requestor)?.supertype == Some(grantor);

        let record = self.units.get_mut(&requestor).ok_or(CbsError::UnknownUnit(requestor))?;
        let Some(pending) = record.pending.take() else {
            return Ok(DischargeReport::default());
        };

        let (rest, outcomes) = discharge(&self.provider, pending, grantor, is_supertype, &key)?;
        record.pending = rest;

        let mut report = DischargeReport::default();
        for outcome in outcomes {
            match outcome.verdict {
                Verdict::Granted => {
                    match outcome.privilege {
                        Privilege::Subclass => record.granted.subclass = true,
                        Privilege::Interface => {
                            record.granted.interfaces.insert(outcome.grantor);
                        }
                        Privilege::Instantiate => {
                            record.granted.instantiations.insert(outcome.grantor);
                        }
                    }
                    tracing::debug!(
                        %requestor,
                        %grantor,
                        privilege = %outcome.privilege,
                        "permit granted"
                    );
                }
                Verdict::Rejected(cause) => {
                    tracing::warn!(
                        %requestor,
                        %grantor,
                        privilege = %outcome.privilege,
                        %cause,
                        "permit rejected"
                    );
                }
            }
            report.record(outcome);
        }
        Ok(report)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Capability queries
    // ─────────────────────────────────────────────────────────────────────

    /// Whether the unit still holds an undischarged subclass permit.
    pub fn has_pending_subclass_permit(&self, unit: UnitId) -> Result<bool> {
        let record = self.unit(unit)?;
        Ok(record
            .pending
            .as_ref()
            .is_some_and(|c| c.iter().any(|p| p.privilege() == Privilege::Subclass)))
    }

    /// Whether the unit still holds an undischarged interface permit for
    /// the given interface.
    pub fn has_pending_interface_permit(&self, unit: UnitId, interface: UnitId) -> Result<bool> {
        let record = self.unit(unit)?;
        Ok(record.pending.as_ref().is_some_and(|c| {
            c.iter()
                .any(|p| p.privilege() == Privilege::Interface && p.grantor() == Some(interface))
        }))
    }

    /// Whether the unit still holds any undischarged instantiation permit.
    pub fn has_pending_instantiation_permit(&self, unit: UnitId) -> Result<bool> {
        let record = self.unit(unit)?;
        Ok(record
            .pending
            .as_ref()
            .is_some_and(|c| c.iter().any(|p| p.privilege() == Privilege::Instantiate)))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────

    /// Allow or deny subclassing the unit's direct supertype.
    ///
    /// Unprotected supertypes need no permit. A pending (undischarged)
    /// permit also denies: the privilege is not yet proven.
    pub fn authorize_subclass(&self, requestor: UnitId) -> Result<()> {
        let record = self.unit(requestor)?;
        let Some(supertype) = record.supertype else {
            return Ok(());
        };
        if !self.keys.contains(supertype) || record.granted.subclass {
            return Ok(());
        }
        Err(CbsError::Denied {
            requestor,
            privilege: Privilege::Subclass,
            grantor: supertype,
        })
    }

    /// Allow or deny implementing a protected interface.
    pub fn authorize_interface(&self, requestor: UnitId, interface: UnitId) -> Result<()> {
        let record = self.unit(requestor)?;
        if !self.keys.contains(interface) || record.granted.interfaces.contains(&interface) {
            return Ok(());
        }
        Err(CbsError::Denied {
            requestor,
            privilege: Privilege::Interface,
            grantor: interface,
        })
    }

    /// Allow or deny instantiating a protected type.
    pub fn authorize_instantiation(&self, requestor: UnitId, target: UnitId) -> Result<()> {
        let record = self.unit(requestor)?;
        if !self.keys.contains(target) || record.granted.instantiations.contains(&target) {
            return Ok(());
        }
        Err(CbsError::Denied {
            requestor,
            privilege: Privilege::Instantiate,
            grantor: target,
        })
    }
}

impl<P: CryptoProvider> std::fmt::Debug for Registry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("units", &self.units.len())
            .field("keys", &self.keys.len())
            .field("bytes_used", &self.store.bytes_used())
            .finish()
    }
}
