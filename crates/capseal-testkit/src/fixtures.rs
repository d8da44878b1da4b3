//! Test fixtures and helpers.
//!
//! Common setup code for exercising the loader/discharge flow end to end.

use capseal::{Registry, TrustAttribute, TrustAttributeBuilder};
use capseal_core::{CryptoProvider, Ed25519Provider, Keypair, UnitId, PROVIDER_IDENTITY};

/// A registry over the Ed25519 provider plus helpers for building signed
/// trust attributes.
pub struct TestFixture {
    pub registry: Registry<Ed25519Provider>,
}

impl TestFixture {
    /// Create a fixture with a fresh registry.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(Ed25519Provider::new()),
        }
    }

    /// Register a protected grantor with a deterministic keypair derived
    /// from `seed`, declare its key, and return the pair.
    pub fn protected_unit(&mut self, name: &str, seed: u8) -> (UnitId, Keypair) {
        let keypair = Keypair::from_seed(&[seed; 32]);
        let id = self.registry.register(name);
        self.registry
            .declare_key(id, &keypair.encoded_public_key())
            .expect("fresh unit accepts a key");
        (id, keypair)
    }

    /// Digest of some signable content under the active provider.
    pub fn digest_of(&self, content: &[u8]) -> Vec<u8> {
        self.registry.provider().digest_content(content)
    }

    /// Start a trust attribute for the given content, with the digest
    /// already filled in.
    pub fn attribute_for(&self, content: &[u8]) -> TrustAttributeBuilder {
        TrustAttribute::builder(PROVIDER_IDENTITY, self.digest_of(content))
    }

    /// A grantor's permit signature over the given content.
    pub fn permit_signature(&self, grantor: &Keypair, content: &[u8]) -> Vec<u8> {
        grantor.sign_digest(&self.digest_of(content))
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Flip one bit of a signature, preserving its length.
pub fn corrupt_signature(signature: &[u8]) -> Vec<u8> {
    let mut corrupted = signature.to_vec();
    if let Some(byte) = corrupted.first_mut() {
        *byte ^= 0x01;
    }
    corrupted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_grant_flow() {
        let mut fx = TestFixture::new();
        let (grantor, owner) = fx.protected_unit("vendor.Protected", 0x01);

        let content = b"requestor bytes";
        let requestor = fx.registry.register("app.Requestor");
        let attr = fx
            .attribute_for(content)
            .instantiate(grantor, fx.permit_signature(&owner, content))
            .build();

        fx.registry.attach_trust(requestor, &attr, content).unwrap();
        let report = fx.registry.mark_loaded(grantor).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.granted.len(), 1);
    }

    #[test]
    fn test_corrupt_signature_changes_exactly_one_bit() {
        let sig = vec![0xffu8; 64];
        let bad = corrupt_signature(&sig);
        assert_eq!(bad.len(), sig.len());

        let differing: u32 = sig
            .iter()
            .zip(&bad)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum();
        assert_eq!(differing, 1);
    }
}
