//! Proptest generators for property-based testing.

use proptest::prelude::*;

use capseal_core::{Digest, Keypair, Privilege, Signature, UnitId};
use capseal_permits::{Permit, PendingPermits};

/// Generate a random keypair from a seed.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random unit handle.
pub fn unit_id() -> impl Strategy<Value = UnitId> {
    (1u32..=10_000).prop_map(UnitId::from_raw)
}

/// Generate a privilege kind.
pub fn privilege() -> impl Strategy<Value = Privilege> {
    prop_oneof![
        Just(Privilege::Subclass),
        Just(Privilege::Interface),
        Just(Privilege::Instantiate),
    ]
}

/// Generate opaque signature bytes of plausible lengths.
pub fn signature_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=96)
}

/// Generate a 32-byte digest artifact.
pub fn digest() -> impl Strategy<Value = Digest> {
    any::<[u8; 32]>().prop_map(|b| Digest::from_bytes(&b))
}

/// Generate a permit with an explicit grantor.
pub fn granted_permit() -> impl Strategy<Value = Permit> {
    (unit_id(), signature_bytes(), any::<bool>()).prop_map(|(grantor, sig, interface)| {
        let sig = Signature::from_bytes(&sig);
        if interface {
            Permit::interface(grantor, sig)
        } else {
            Permit::instantiate(grantor, sig)
        }
    })
}

/// Generate a fully populated container with `1..=max` permits, the
/// optional subclass permit first.
pub fn pending_permits(max: usize) -> impl Strategy<Value = PendingPermits> {
    (
        digest(),
        any::<bool>(),
        prop::collection::vec(granted_permit(), 0..max),
    )
        .prop_filter("at least one permit", |(_, subclass, rest)| {
            *subclass || !rest.is_empty()
        })
        .prop_map(|(digest, subclass, rest)| {
            let capacity = usize::from(subclass) + rest.len();
            let mut container = PendingPermits::new(digest, capacity);
            if subclass {
                container
                    .add(Permit::subclass(Signature::from_bytes(&[0u8; 64])), false)
                    .expect("sized to fit");
            }
            for permit in rest {
                let is_interface = permit.privilege() == Privilege::Interface;
                container.add(permit, is_interface).expect("sized to fit");
            }
            container
        })
}
