//! Error types for the capseal core.

use thiserror::Error;

/// The four crypto result kinds the core branches on.
///
/// Concrete providers map their algorithm-specific failures onto these; the
/// core never inspects anything finer. `Copy` so a single cached key-decode
/// failure can be fanned out to every permit from the same grantor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("unsupported public key size")]
    UnsupportedKeySize,

    #[error("unsupported signature size")]
    UnsupportedSignatureSize,

    #[error("invalid cryptographic encoding")]
    InvalidEncoding,

    #[error("signature verification failed")]
    VerifyFail,
}
