//! Concrete provider: Ed25519 signatures over Blake3 content digests.
//!
//! Wire encodings are the raw forms: 32-byte public keys, 64-byte
//! signatures, 32-byte digests. The provider identity string is
//! `"ed25519-blake3"`.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

use crate::artifact::Digest;
use crate::error::CryptoError;
use crate::provider::CryptoProvider;

/// Identity string embedded in trust attributes built for this provider.
pub const PROVIDER_IDENTITY: &str = "ed25519-blake3";

/// Ed25519 + Blake3 implementation of the provider boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Provider;

impl Ed25519Provider {
    /// Create the provider. Stateless.
    pub fn new() -> Self {
        Self
    }
}

impl CryptoProvider for Ed25519Provider {
    type PublicKey = VerifyingKey;
    type Signature = ed25519_dalek::Signature;

    fn verify_provider_identity(&self, identifier: &[u8]) -> bool {
        identifier == PROVIDER_IDENTITY.as_bytes()
    }

    fn decode_public_key(&self, encoded: &[u8]) -> Result<VerifyingKey, CryptoError> {
        let bytes: &[u8; 32] = encoded
            .try_into()
            .map_err(|_| CryptoError::UnsupportedKeySize)?;
        // A 32-byte blob can still fail point decompression.
        VerifyingKey::from_bytes(bytes).map_err(|_| CryptoError::InvalidEncoding)
    }

    fn decode_signature(&self, encoded: &[u8]) -> Result<ed25519_dalek::Signature, CryptoError> {
        let bytes: &[u8; 64] = encoded
            .try_into()
            .map_err(|_| CryptoError::UnsupportedSignatureSize)?;
        Ok(ed25519_dalek::Signature::from_bytes(bytes))
    }

    fn digest_content(&self, content: &[u8]) -> Vec<u8> {
        blake3::hash(content).as_bytes().to_vec()
    }

    fn verify(
        &self,
        signature: &ed25519_dalek::Signature,
        digest: &Digest,
        key: &VerifyingKey,
    ) -> Result<(), CryptoError> {
        key.verify(digest.as_bytes(), signature)
            .map_err(|_| CryptoError::VerifyFail)
    }
}

/// A grantor keypair for producing permits offline.
///
/// The runtime itself only verifies; signing lives in tooling and tests.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The public key in its wire encoding (raw 32 bytes).
    pub fn encoded_public_key(&self) -> Vec<u8> {
        self.signing_key.verifying_key().to_bytes().to_vec()
    }

    /// Sign a digest, returning the signature in its wire encoding.
    pub fn sign_digest(&self, digest: &[u8]) -> Vec<u8> {
        self.signing_key.sign(digest).to_bytes().to_vec()
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Keypair({})", hex::encode(self.encoded_public_key()))
    }
}
