//! End-to-end discharge scenarios through the registry.
//!
//! Each scenario drives the full loader flow: register units, declare
//! grantor keys, attach a signed trust attribute, load the grantor, then
//! check capability queries and authorization.

use std::cell::Cell;
use std::rc::Rc;

use capseal::{CbsError, Registry, TrustAttribute};
use capseal_core::{
    CryptoError, CryptoProvider, Digest, Ed25519Provider, Keypair, Privilege, UnitId,
    PROVIDER_IDENTITY,
};

struct Scenario {
    registry: Registry<Ed25519Provider>,
    grantor: UnitId,
    owner: Keypair,
}

fn scenario() -> Scenario {
    let mut registry = Registry::new(Ed25519Provider::new());
    let owner = Keypair::from_seed(&[0x5a; 32]);
    let grantor = registry.register("vendor.Protected");
    registry
        .declare_key(grantor, &owner.encoded_public_key())
        .unwrap();
    Scenario {
        registry,
        grantor,
        owner,
    }
}

fn signed_digest(registry: &Registry<Ed25519Provider>, owner: &Keypair, content: &[u8]) -> Vec<u8> {
    owner.sign_digest(&registry.provider().digest_content(content))
}

// ─────────────────────────────────────────────────────────────────────────
// Scenario A: valid subclass permit grants after the supertype loads.
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn subclass_permit_grants_after_supertype_loads() {
    let Scenario {
        mut registry,
        grantor,
        owner,
    } = scenario();

    let content = b"class X extends vendor.Protected";
    let requestor = registry.register("app.X");
    registry.set_supertype(requestor, grantor).unwrap();

    let digest = registry.provider().digest_content(content);
    let attr = TrustAttribute::builder(PROVIDER_IDENTITY, digest)
        .subclass(signed_digest(&registry, &owner, content))
        .build();

    let report = registry.attach_trust(requestor, &attr, content).unwrap();
    assert_eq!(report.total(), 0, "grantor not loaded yet");
    assert!(registry.has_pending_subclass_permit(requestor).unwrap());
    assert!(registry.authorize_subclass(requestor).is_err());

    let report = registry.mark_loaded(grantor).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.granted[0].privilege, Privilege::Subclass);

    assert!(!registry.has_pending_subclass_permit(requestor).unwrap());
    registry.authorize_subclass(requestor).unwrap();
    // The emptied container is discarded outright.
    assert!(registry.unit(requestor).unwrap().pending().is_none());
}

// ─────────────────────────────────────────────────────────────────────────
// Scenario B: one flipped bit rejects and the denial names "subclass".
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn corrupted_subclass_permit_rejects_with_verify_fail() {
    let Scenario {
        mut registry,
        grantor,
        owner,
    } = scenario();

    let content = b"class X extends vendor.Protected";
    let requestor = registry.register("app.X");
    registry.set_supertype(requestor, grantor).unwrap();

    let mut signature = signed_digest(&registry, &owner, content);
    signature[0] ^= 0x01;

    let digest = registry.provider().digest_content(content);
    let attr = TrustAttribute::builder(PROVIDER_IDENTITY, digest)
        .subclass(signature)
        .build();

    registry.attach_trust(requestor, &attr, content).unwrap();
    let report = registry.mark_loaded(grantor).unwrap();

    assert_eq!(report.rejected.len(), 1);
    assert_eq!(
        report.rejected[0].verdict,
        capseal_permits::Verdict::Rejected(CryptoError::VerifyFail)
    );

    // Rejection is terminal: the permit is gone, the privilege denied.
    assert!(!registry.has_pending_subclass_permit(requestor).unwrap());
    let err = registry.authorize_subclass(requestor).unwrap_err();
    match err {
        CbsError::Denied { privilege, .. } => assert_eq!(privilege, Privilege::Subclass),
        other => panic!("expected Denied, got {other:?}"),
    }
    assert!(err.to_string().contains("subclass"));
}

// ─────────────────────────────────────────────────────────────────────────
// Scenario C: interface and instantiation permits resolve independently.
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn mixed_permits_resolve_per_verify_outcome() {
    let Scenario {
        mut registry,
        grantor,
        owner,
    } = scenario();

    let content = b"class Y implements I1, I2 and instantiates vendor.Protected";
    let requestor = registry.register("app.Y");

    let good = signed_digest(&registry, &owner, content);
    let bad = {
        let mut sig = good.clone();
        sig[17] ^= 0x10;
        sig
    };

    // Two interface permits (one corrupted) and one instantiation permit,
    // all from the same grantor.
    let digest = registry.provider().digest_content(content);
    let attr = TrustAttribute::builder(PROVIDER_IDENTITY, digest)
        .implement(grantor, good.clone())
        .implement(grantor, bad)
        .instantiate(grantor, good)
        .build();
    assert_eq!(attr.interface_permit_count, 2);
    assert_eq!(attr.total_permits(), 3);

    registry.attach_trust(requestor, &attr, content).unwrap();
    let report = registry.mark_loaded(grantor).unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(report.granted.len(), 2);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].privilege, Privilege::Interface);

    // Each privilege independently reflects its own verify outcome.
    registry.authorize_interface(requestor, grantor).unwrap();
    registry.authorize_instantiation(requestor, grantor).unwrap();
    assert!(registry.unit(requestor).unwrap().pending().is_none());
}

// ─────────────────────────────────────────────────────────────────────────
// Scenario D: a bad grantor key fails fast across all requestors.
// ─────────────────────────────────────────────────────────────────────────

/// Provider wrapper that counts verify attempts.
#[derive(Clone)]
struct CountingProvider {
    inner: Ed25519Provider,
    verifies: Rc<Cell<usize>>,
}

impl CryptoProvider for CountingProvider {
    type PublicKey = <Ed25519Provider as CryptoProvider>::PublicKey;
    type Signature = <Ed25519Provider as CryptoProvider>::Signature;

    fn verify_provider_identity(&self, identifier: &[u8]) -> bool {
        self.inner.verify_provider_identity(identifier)
    }

    fn decode_public_key(&self, encoded: &[u8]) -> Result<Self::PublicKey, CryptoError> {
        self.inner.decode_public_key(encoded)
    }

    fn decode_signature(&self, encoded: &[u8]) -> Result<Self::Signature, CryptoError> {
        self.inner.decode_signature(encoded)
    }

    fn digest_content(&self, content: &[u8]) -> Vec<u8> {
        self.inner.digest_content(content)
    }

    fn verify(
        &self,
        signature: &Self::Signature,
        digest: &Digest,
        key: &Self::PublicKey,
    ) -> Result<(), CryptoError> {
        self.verifies.set(self.verifies.get() + 1);
        self.inner.verify(signature, digest, key)
    }
}

#[test]
fn malformed_grantor_key_rejects_all_requestors_without_verifying() {
    let verifies = Rc::new(Cell::new(0));
    let provider = CountingProvider {
        inner: Ed25519Provider::new(),
        verifies: Rc::clone(&verifies),
    };
    let mut registry = Registry::new(provider);

    let owner = Keypair::from_seed(&[0x5a; 32]);
    let grantor = registry.register("vendor.Protected");
    // Truncated key encoding: decodes to UnsupportedKeySize.
    registry.declare_key(grantor, &[0u8; 16]).unwrap();

    let mut requestors = Vec::new();
    for i in 0..3 {
        let content = format!("requestor {i} content");
        let requestor = registry.register(&format!("app.R{i}"));
        let digest = registry.provider().digest_content(content.as_bytes());
        let attr = TrustAttribute::builder(PROVIDER_IDENTITY, digest.clone())
            .instantiate(grantor, owner.sign_digest(&digest))
            .build();
        registry
            .attach_trust(requestor, &attr, content.as_bytes())
            .unwrap();
        requestors.push(requestor);
    }

    let report = registry.mark_loaded(grantor).unwrap();

    assert_eq!(report.rejected.len(), 3);
    for outcome in &report.rejected {
        assert_eq!(
            outcome.verdict,
            capseal_permits::Verdict::Rejected(CryptoError::UnsupportedKeySize)
        );
    }
    assert_eq!(verifies.get(), 0, "no per-signature verify on a bad key");

    for requestor in requestors {
        assert!(registry
            .authorize_instantiation(requestor, grantor)
            .is_err());
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Attachment validation and interning behavior
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn requestor_attaching_after_grantor_load_discharges_immediately() {
    let Scenario {
        mut registry,
        grantor,
        owner,
    } = scenario();
    registry.mark_loaded(grantor).unwrap();

    let content = b"late requestor";
    let requestor = registry.register("app.Late");
    let digest = registry.provider().digest_content(content);
    let attr = TrustAttribute::builder(PROVIDER_IDENTITY, digest)
        .instantiate(grantor, signed_digest(&registry, &owner, content))
        .build();

    let report = registry.attach_trust(requestor, &attr, content).unwrap();
    assert_eq!(report.granted.len(), 1);
    registry.authorize_instantiation(requestor, grantor).unwrap();
}

#[test]
fn digest_mismatch_is_refused_at_attach() {
    let Scenario {
        mut registry,
        grantor,
        owner,
    } = scenario();

    let content = b"actual content";
    let requestor = registry.register("app.Liar");
    let forged_digest = registry.provider().digest_content(b"other content");
    let attr = TrustAttribute::builder(PROVIDER_IDENTITY, forged_digest.clone())
        .instantiate(grantor, owner.sign_digest(&forged_digest))
        .build();

    let err = registry.attach_trust(requestor, &attr, content).unwrap_err();
    assert!(matches!(err, CbsError::DigestMismatch { .. }));
}

#[test]
fn foreign_provider_attribute_is_refused() {
    let Scenario { mut registry, .. } = scenario();

    let content = b"content";
    let requestor = registry.register("app.Foreign");
    let attr = TrustAttribute::builder("rsa-sha1", registry.provider().digest_content(content))
        .build();

    let err = registry.attach_trust(requestor, &attr, content).unwrap_err();
    assert!(matches!(err, CbsError::ProviderMismatch { .. }));
}

#[test]
fn trust_attaches_at_most_once() {
    let Scenario {
        mut registry,
        grantor,
        owner,
    } = scenario();

    let content = b"content";
    let requestor = registry.register("app.Twice");
    let digest = registry.provider().digest_content(content);
    let attr = TrustAttribute::builder(PROVIDER_IDENTITY, digest)
        .instantiate(grantor, signed_digest(&registry, &owner, content))
        .build();

    registry.attach_trust(requestor, &attr, content).unwrap();
    let err = registry.attach_trust(requestor, &attr, content).unwrap_err();
    assert!(matches!(err, CbsError::TrustAlreadyAttached(u) if u == requestor));
}

#[test]
fn identical_signatures_within_a_unit_are_interned_once() {
    let Scenario {
        mut registry,
        grantor,
        owner,
    } = scenario();

    let content = b"unit with repeated signature bytes";
    let requestor = registry.register("app.Dedup");
    let signature = signed_digest(&registry, &owner, content);

    let digest = registry.provider().digest_content(content);
    let attr = TrustAttribute::builder(PROVIDER_IDENTITY, digest)
        .implement(grantor, signature.clone())
        .instantiate(grantor, signature.clone())
        .build();

    let before = registry.store().bytes_used();
    registry.attach_trust(requestor, &attr, content).unwrap();
    let added = registry.store().bytes_used() - before;

    // One digest plus one signature; the second permit shares the blob.
    assert_eq!(added, attr.digest.len() + signature.len());

    let container = registry.unit(requestor).unwrap().pending().unwrap();
    let first = container.at(0).unwrap().signature();
    let second = container.at(1).unwrap().signature();
    assert!(first.ptr_eq(second));
}

#[test]
fn unprotected_counterparts_need_no_permit() {
    let mut registry = Registry::new(Ed25519Provider::new());
    let plain = registry.register("app.Plain");
    let other = registry.register("app.Other");

    registry.authorize_subclass(plain).unwrap();
    registry.authorize_interface(plain, other).unwrap();
    registry.authorize_instantiation(plain, other).unwrap();
}

#[test]
fn unit_without_permit_for_protected_type_is_denied() {
    let Scenario {
        mut registry,
        grantor,
        ..
    } = scenario();
    registry.mark_loaded(grantor).unwrap();

    let requestor = registry.register("app.NoPermit");
    let err = registry
        .authorize_instantiation(requestor, grantor)
        .unwrap_err();
    assert!(matches!(
        err,
        CbsError::Denied {
            privilege: Privilege::Instantiate,
            ..
        }
    ));
}
