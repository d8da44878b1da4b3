//! The trust attribute in its already-decoded form.
//!
//! The class-file reader parses lengths and offsets; by the time the core
//! sees an attribute it is this structure. The wire form between loader and
//! core is CBOR.
//!
//! Layout mirrors the on-disk attribute: a content digest, an optional
//! subclass-permit signature, the interface permit count, and a sequence of
//! `(grantor, signature)` pairs in which the first `interface_permit_count`
//! entries are interface permits and the rest are instantiation permits.

use serde::{Deserialize, Serialize};

use capseal_core::UnitId;

/// One `(grantor, signature)` pair from the attribute's permit sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitEntry {
    /// The grantor, already resolved by the loader to a unit handle.
    pub grantor: UnitId,

    /// The grantor's signature over the requestor's content digest.
    pub signature: Vec<u8>,
}

/// A unit's decoded trust attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustAttribute {
    /// Identity of the provider the attribute was built against.
    pub provider: String,

    /// Declared digest of the unit's signable content.
    pub digest: Vec<u8>,

    /// Signature for the distinguished subclass permit, if present.
    pub subclass_signature: Option<Vec<u8>>,

    /// How many leading entries of `permits` are interface permits.
    pub interface_permit_count: usize,

    /// Interface permits followed by instantiation permits.
    pub permits: Vec<PermitEntry>,
}

impl TrustAttribute {
    /// Start building an attribute for the given provider and digest.
    pub fn builder(provider: impl Into<String>, digest: Vec<u8>) -> TrustAttributeBuilder {
        TrustAttributeBuilder {
            provider: provider.into(),
            digest,
            subclass_signature: None,
            interface_permits: Vec::new(),
            instantiation_permits: Vec::new(),
        }
    }

    /// Total permit count: the optional subclass permit plus all pairs.
    pub fn total_permits(&self) -> usize {
        usize::from(self.subclass_signature.is_some()) + self.permits.len()
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ciborium::de::Error<std::io::Error>> {
        ciborium::from_reader(bytes)
    }
}

/// Builder that produces the canonical load-time permit ordering:
/// `[subclass] [interfaces...] [instantiations...]`.
#[derive(Debug)]
pub struct TrustAttributeBuilder {
    provider: String,
    digest: Vec<u8>,
    subclass_signature: Option<Vec<u8>>,
    interface_permits: Vec<PermitEntry>,
    instantiation_permits: Vec<PermitEntry>,
}

impl TrustAttributeBuilder {
    /// Set the subclass-permit signature.
    pub fn subclass(mut self, signature: Vec<u8>) -> Self {
        self.subclass_signature = Some(signature);
        self
    }

    /// Add an interface-implementation permit.
    pub fn implement(mut self, grantor: UnitId, signature: Vec<u8>) -> Self {
        self.interface_permits.push(PermitEntry { grantor, signature });
        self
    }

    /// Add an instantiation permit.
    pub fn instantiate(mut self, grantor: UnitId, signature: Vec<u8>) -> Self {
        self.instantiation_permits
            .push(PermitEntry { grantor, signature });
        self
    }

    /// Finish the attribute.
    pub fn build(self) -> TrustAttribute {
        let interface_permit_count = self.interface_permits.len();
        let mut permits = self.interface_permits;
        permits.extend(self.instantiation_permits);
        TrustAttribute {
            provider: self.provider,
            digest: self.digest,
            subclass_signature: self.subclass_signature,
            interface_permit_count,
            permits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_orders_permits() {
        let attr = TrustAttribute::builder("ed25519-blake3", vec![0xd0; 32])
            .instantiate(UnitId::from_raw(3), vec![3; 64])
            .subclass(vec![1; 64])
            .implement(UnitId::from_raw(2), vec![2; 64])
            .build();

        assert_eq!(attr.interface_permit_count, 1);
        assert_eq!(attr.permits[0].grantor, UnitId::from_raw(2));
        assert_eq!(attr.permits[1].grantor, UnitId::from_raw(3));
        assert_eq!(attr.total_permits(), 3);
    }

    #[test]
    fn test_cbor_roundtrip() {
        let attr = TrustAttribute::builder("ed25519-blake3", vec![0xd0; 32])
            .subclass(vec![1; 64])
            .implement(UnitId::from_raw(2), vec![2; 64])
            .build();

        let bytes = attr.to_bytes();
        let recovered = TrustAttribute::from_bytes(&bytes).unwrap();
        assert_eq!(attr, recovered);
    }

    #[test]
    fn test_total_permits_without_subclass() {
        let attr = TrustAttribute::builder("ed25519-blake3", vec![0xd0; 32])
            .instantiate(UnitId::from_raw(3), vec![3; 64])
            .build();
        assert_eq!(attr.total_permits(), 1);
    }
}
