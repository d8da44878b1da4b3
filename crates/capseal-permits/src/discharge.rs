//! The discharge protocol.
//!
//! Once a grantor becomes available, every pending permit naming it is
//! resolved to a terminal verdict: granted or rejected. Both verdicts
//! remove the permit from the container; there is no re-pending transition.
//! Crypto failures never propagate out of discharge — they become permit
//! rejections that the caller turns into privilege denials.

use capseal_core::{CryptoError, CryptoProvider, Privilege, UnitId};

use crate::container::PendingPermits;
use crate::error::Result;

/// Terminal state of one discharged permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The signature verified; the privilege is now unconditionally held.
    Granted,

    /// Decoding or verification failed; the privilege stays unproven.
    Rejected(CryptoError),
}

impl Verdict {
    /// Whether this verdict grants the privilege.
    pub fn is_granted(&self) -> bool {
        matches!(self, Verdict::Granted)
    }
}

/// One permit's resolution, as reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DischargeOutcome {
    /// The grantor the permit was resolved against.
    pub grantor: UnitId,

    /// The privilege the permit claimed.
    pub privilege: Privilege,

    /// Granted or rejected.
    pub verdict: Verdict,
}

/// Resolve every pending permit applicable to `grantor`.
///
/// `key` is the grantor's shared key-decode result. A decode failure fails
/// fast: every applicable permit rejects with that error and no signature
/// is decoded or verified (a malformed key cannot authenticate anything).
///
/// Consumes the container and returns it compacted, or `None` when the last
/// permit was discharged. Discharge order across permits is unspecified;
/// each permit is independently sufficient proof of its privilege.
pub fn discharge<P: CryptoProvider>(
    provider: &P,
    pending: PendingPermits,
    grantor: UnitId,
    grantor_is_direct_supertype: bool,
    key: &std::result::Result<P::PublicKey, CryptoError>,
) -> Result<(Option<PendingPermits>, Vec<DischargeOutcome>)> {
    // Scan first, mutate after: removal re-orders the container, so the
    // applicable indices are collected up front and applied in descending
    // order, where swap-remove cannot disturb a smaller index.
    let mut resolved: Vec<(usize, DischargeOutcome)> = Vec::new();

    for (index, permit) in pending.iter().enumerate() {
        if !permit.applies_to(grantor, grantor_is_direct_supertype) {
            continue;
        }

        let verdict = match key {
            Err(e) => Verdict::Rejected(*e),
            Ok(key) => match provider.decode_signature(permit.signature().as_bytes()) {
                Err(e) => Verdict::Rejected(e),
                Ok(sig) => match provider.verify(&sig, pending.digest(), key) {
                    Ok(()) => Verdict::Granted,
                    Err(e) => Verdict::Rejected(e),
                },
            },
        };

        resolved.push((
            index,
            DischargeOutcome {
                grantor,
                privilege: permit.privilege(),
                verdict,
            },
        ));
    }

    let mut container = Some(pending);
    let mut outcomes = Vec::with_capacity(resolved.len());
    for (index, outcome) in resolved.into_iter().rev() {
        if let Some(c) = container.take() {
            container = c.remove(index)?;
        }
        outcomes.push(outcome);
    }
    outcomes.reverse();

    Ok((container, outcomes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permit::Permit;
    use capseal_core::{Digest, Ed25519Provider, Keypair, Signature};

    struct Setup {
        provider: Ed25519Provider,
        grantor: UnitId,
        digest: Digest,
        key: std::result::Result<ed25519_dalek::VerifyingKey, CryptoError>,
        keypair: Keypair,
    }

    fn setup() -> Setup {
        let provider = Ed25519Provider::new();
        let keypair = Keypair::from_seed(&[0x21; 32]);
        let digest_bytes = provider.digest_content(b"requestor content");
        let key = provider.decode_public_key(&keypair.encoded_public_key());
        Setup {
            provider,
            grantor: UnitId::from_raw(1),
            digest: Digest::from_bytes(&digest_bytes),
            key,
            keypair,
        }
    }

    fn signed(setup: &Setup) -> Signature {
        Signature::from_bytes(&setup.keypair.sign_digest(setup.digest.as_bytes()))
    }

    #[test]
    fn test_valid_permit_grants_and_empties_container() {
        let s = setup();
        let mut pending = PendingPermits::new(s.digest.clone(), 1);
        pending
            .add(Permit::instantiate(s.grantor, signed(&s)), false)
            .unwrap();

        let (rest, outcomes) =
            discharge(&s.provider, pending, s.grantor, false, &s.key).unwrap();

        assert!(rest.is_none());
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].verdict, Verdict::Granted);
        assert_eq!(outcomes[0].privilege, Privilege::Instantiate);
    }

    #[test]
    fn test_corrupt_signature_rejects() {
        let s = setup();
        let mut bytes = s.keypair.sign_digest(s.digest.as_bytes());
        bytes[10] ^= 0x80;

        let mut pending = PendingPermits::new(s.digest.clone(), 1);
        pending
            .add(
                Permit::interface(s.grantor, Signature::from_bytes(&bytes)),
                true,
            )
            .unwrap();

        let (rest, outcomes) =
            discharge(&s.provider, pending, s.grantor, false, &s.key).unwrap();

        assert!(rest.is_none());
        assert_eq!(outcomes[0].verdict, Verdict::Rejected(CryptoError::VerifyFail));
    }

    #[test]
    fn test_undersized_signature_rejects_with_size_error() {
        let s = setup();
        let mut pending = PendingPermits::new(s.digest.clone(), 1);
        pending
            .add(
                Permit::interface(s.grantor, Signature::from_bytes(&[0u8; 10])),
                true,
            )
            .unwrap();

        let (_, outcomes) =
            discharge(&s.provider, pending, s.grantor, false, &s.key).unwrap();

        assert_eq!(
            outcomes[0].verdict,
            Verdict::Rejected(CryptoError::UnsupportedSignatureSize)
        );
    }

    #[test]
    fn test_key_decode_failure_fails_fast() {
        let s = setup();
        // A valid signature that would have verified, plus garbage.
        let mut pending = PendingPermits::new(s.digest.clone(), 2);
        pending
            .add(Permit::interface(s.grantor, signed(&s)), true)
            .unwrap();
        pending
            .add(Permit::instantiate(s.grantor, signed(&s)), false)
            .unwrap();

        let bad_key: std::result::Result<ed25519_dalek::VerifyingKey, CryptoError> =
            Err(CryptoError::UnsupportedKeySize);
        let (rest, outcomes) =
            discharge(&s.provider, pending, s.grantor, false, &bad_key).unwrap();

        assert!(rest.is_none());
        assert_eq!(outcomes.len(), 2);
        for outcome in outcomes {
            assert_eq!(
                outcome.verdict,
                Verdict::Rejected(CryptoError::UnsupportedKeySize)
            );
        }
    }

    #[test]
    fn test_unrelated_permits_stay_pending() {
        let s = setup();
        let other = UnitId::from_raw(99);

        let mut pending = PendingPermits::new(s.digest.clone(), 2);
        pending
            .add(Permit::instantiate(s.grantor, signed(&s)), false)
            .unwrap();
        pending
            .add(
                Permit::instantiate(other, Signature::from_bytes(&[1u8; 64])),
                false,
            )
            .unwrap();

        let (rest, outcomes) =
            discharge(&s.provider, pending, s.grantor, false, &s.key).unwrap();

        let rest = rest.expect("unrelated permit remains");
        assert_eq!(rest.len(), 1);
        assert_eq!(rest.at(0).unwrap().grantor(), Some(other));
        assert_eq!(outcomes.len(), 1);
    }

    #[test]
    fn test_subclass_permit_needs_supertype_grantor() {
        let s = setup();
        let mut pending = PendingPermits::new(s.digest.clone(), 1);
        pending.add(Permit::subclass(signed(&s)), false).unwrap();

        // Not the direct supertype: nothing discharges.
        let (rest, outcomes) = discharge(
            &s.provider,
            pending,
            s.grantor,
            false,
            &s.key,
        )
        .unwrap();
        let pending = rest.expect("subclass permit still pending");
        assert!(outcomes.is_empty());

        // As the direct supertype: grants.
        let (rest, outcomes) =
            discharge(&s.provider, pending, s.grantor, true, &s.key).unwrap();
        assert!(rest.is_none());
        assert_eq!(outcomes[0].verdict, Verdict::Granted);
        assert_eq!(outcomes[0].privilege, Privilege::Subclass);
    }
}
