//! # Recoverable ECDSA (secp256k1)
//!
//! Transaction signing for the account model: signatures are produced over
//! a 32-byte prehash and carry a recovery id, so the sender's public key
//! (and from it the sender's address) can be reconstructed from the
//! signature alone.
//!
//! ## Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalized signatures
//! - Uncompressed SEC1 public keys (65 bytes, leading `0x04`)

use crate::errors::CryptoError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use zeroize::Zeroize;

/// A signature split into its `(r, s)` halves plus the recovery id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    /// Big-endian `r` scalar.
    pub r: [u8; 32],
    /// Big-endian `s` scalar.
    pub s: [u8; 32],
    /// Recovery id (0 or 1).
    pub recovery_id: u8,
}

/// secp256k1 ECDSA keypair.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes(bytes.into()).map_err(|_| CryptoError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// Uncompressed SEC1 public key (65 bytes, leading `0x04`).
    pub fn public_key_uncompressed(&self) -> [u8; 65] {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        let mut bytes = [0u8; 65];
        bytes.copy_from_slice(point.as_bytes());
        bytes
    }

    /// Sign a 32-byte prehash, returning `(r, s)` and the recovery id.
    pub fn sign_prehash(&self, prehash: &[u8; 32]) -> Result<RecoverableSignature, CryptoError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(prehash)
            .map_err(|_| CryptoError::SigningFailed)?;

        let bytes: [u8; 64] = signature.to_bytes().into();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);

        Ok(RecoverableSignature {
            r,
            s,
            recovery_id: recovery_id.to_byte(),
        })
    }

    /// Secret key bytes (for serialization).
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

/// Recover the uncompressed public key that produced a signature.
///
/// # Errors
/// - `InvalidRecoveryId` if the id is not 0 or 1
/// - `InvalidSignature` if `(r, s)` do not form a valid signature
/// - `RecoveryFailed` if no public key matches
pub fn recover_public_key(
    prehash: &[u8; 32],
    signature: &RecoverableSignature,
) -> Result<[u8; 65], CryptoError> {
    let recovery_id = RecoveryId::from_byte(signature.recovery_id)
        .ok_or(CryptoError::InvalidRecoveryId(signature.recovery_id))?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&sig_bytes).map_err(|_| CryptoError::InvalidSignature)?;

    let verifying_key = VerifyingKey::recover_from_prehash(prehash, &sig, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;

    let point = verifying_key.to_encoded_point(false);
    let mut bytes = [0u8; 65];
    bytes.copy_from_slice(point.as_bytes());
    Ok(bytes)
}
