use thiserror::Error;

/// Errors raised by the cryptographic primitives.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid secret key")]
    InvalidSecretKey,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature encoding")]
    InvalidSignature,

    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("signing failed")]
    SigningFailed,

    #[error("public key recovery failed")]
    RecoveryFailed,
}
