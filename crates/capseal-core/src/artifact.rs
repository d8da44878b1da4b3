//! Cryptographic artifact blobs: digests, signatures, and encoded keys.
//!
//! All three are immutable, variable-length byte sequences owned by the
//! artifact store and referenced (not owned) by the units that carry them.
//! Backing storage is `Bytes`, so a clone shares the same allocation: two
//! references interned to the same blob are pointer-identical, which is how
//! deduplication stays observable. The blobs are leaf data with no internal
//! references.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A content digest of a unit's signable bytes.
///
/// Digests are never deduplicated: each unit's content digest is essentially
/// unique, so every intern call allocates a fresh blob.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest(Bytes);

/// A permit signature: the grantor's signature over a requestor's digest.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(Bytes);

/// A grantor's public key in its trust-attribute-declared encoding.
///
/// Decoding is the provider's job; the core only stores and hands over the
/// opaque bytes. There is no chain-link field here: the key table indexes
/// keys with an ordinary map.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodedKey(Bytes);

macro_rules! blob_impl {
    ($name:ident, $label:literal) => {
        impl $name {
            /// Wrap a freshly copied byte blob.
            pub fn from_bytes(bytes: &[u8]) -> Self {
                Self(Bytes::copy_from_slice(bytes))
            }

            /// Length of the blob in bytes.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Whether the blob is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// The raw bytes.
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Whether two references share the same backing allocation.
            ///
            /// True for clones of one interned blob, false for separately
            /// allocated blobs even when their bytes are equal.
            pub fn ptr_eq(&self, other: &Self) -> bool {
                self.0.len() == other.0.len() && self.0.as_ptr() == other.0.as_ptr()
            }

            /// Convert to hex string.
            pub fn to_hex(&self) -> String {
                hex::encode(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let hex = self.to_hex();
                let head = &hex[..hex.len().min(16)];
                write!(f, concat!($label, "({}\u{2026}, {} bytes)"), head, self.len())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }
    };
}

blob_impl!(Digest, "Digest");
blob_impl!(Signature, "Signature");
blob_impl!(EncodedKey, "EncodedKey");
