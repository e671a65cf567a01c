//! # shared-crypto
//!
//! Cryptographic primitives shared across the Ember-Chain workspace.
//!
//! ## Contents
//!
//! - **Hashing**: Keccak-256, the single digest function used for trie node
//!   addressing, transaction identity, code hashes and address derivation.
//! - **ECDSA**: secp256k1 signatures with public-key recovery, used for
//!   transaction signing and sender recovery.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Secret key material zeroized on drop
//! - Recovery ids carried alongside `(r, s)` so the signer's public key can
//!   be reconstructed from a signature without a key registry

pub mod ecdsa;
pub mod errors;
pub mod hashing;

pub use ecdsa::{recover_public_key, KeyPair, RecoverableSignature};
pub use errors::CryptoError;
pub use hashing::{keccak256, keccak256_many, Hash, KeccakHasher};
