//! The cryptographic provider boundary.
//!
//! The discharge protocol calls through this trait and never implements it;
//! concrete signature and digest algorithms live entirely behind it. The
//! core only branches on the four [`CryptoError`] kinds.

use crate::artifact::Digest;
use crate::error::CryptoError;

/// Abstract contract between the security core and a crypto implementation.
///
/// All operations are synchronous and single-shot; no streaming digest API
/// is needed because a unit's signable content is digested in one pass
/// during loading.
pub trait CryptoProvider {
    /// Decoded public key, cached per grantor by the registry.
    type PublicKey: Clone;

    /// Decoded signature, produced per permit immediately before a verify.
    type Signature;

    /// Confirm that a unit was built against this provider.
    ///
    /// Prevents cross-provider encoding confusion: a trust attribute
    /// produced for a different provider must not be interpreted here.
    fn verify_provider_identity(&self, identifier: &[u8]) -> bool;

    /// Decode a public key from its trust-attribute-declared encoding.
    fn decode_public_key(&self, encoded: &[u8]) -> Result<Self::PublicKey, CryptoError>;

    /// Decode a signature from its trust-attribute-declared encoding.
    fn decode_signature(&self, encoded: &[u8]) -> Result<Self::Signature, CryptoError>;

    /// Digest a unit's signable content.
    fn digest_content(&self, content: &[u8]) -> Vec<u8>;

    /// Verify a signature over a digest with a decoded key.
    ///
    /// `Ok(())` is the only grant outcome; every error kind is a rejection.
    fn verify(
        &self,
        signature: &Self::Signature,
        digest: &Digest,
        key: &Self::PublicKey,
    ) -> Result<(), CryptoError>;
}
