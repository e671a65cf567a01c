//! # Core Domain Entities
//!
//! Identity types (`Hash`, `Address`) with their derivations, and the
//! `Account` record stored in the state trie.

use crate::errors::CodecError;
use serde::{Deserialize, Serialize};
use shared_crypto::{keccak256, keccak256_many, CryptoError, KeyPair};
use std::collections::BTreeMap;

/// A 32-byte Keccak-256 digest.
pub type Hash = [u8; 32];

pub const HASH_LENGTH: usize = 32;

/// A 20-byte account address.
pub type Address = [u8; 20];

pub const ADDRESS_LENGTH: usize = 20;

/// The all-zero address. A transaction "to" this address carrying code
/// bytes is treated as contract creation.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Derive an address from an uncompressed SEC1 public key.
///
/// The full 65-byte encoding, point tag included, is hashed; the address
/// is the first 20 bytes of the digest. Contract addresses use the same
/// truncation (see [`contract_address`]) so all addresses share one shape.
pub fn address_from_public_key(public_key: &[u8; 65]) -> Address {
    let digest = keccak256(public_key);
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[..ADDRESS_LENGTH]);
    address
}

/// Derive the address controlled by a secret key.
pub fn address_from_secret(secret: &[u8; 32]) -> Result<Address, CryptoError> {
    let keypair = KeyPair::from_secret_bytes(secret)?;
    Ok(address_from_public_key(&keypair.public_key_uncompressed()))
}

/// Derive the address of a contract created by `sender` at `nonce`.
pub fn contract_address(sender: &Address, nonce: u64) -> Address {
    let digest = keccak256_many(&[sender, &[nonce as u8]]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[..ADDRESS_LENGTH]);
    address
}

/// The state of an account in the state trie.
///
/// Created implicitly on first read (all-zero record), mutated only by the
/// execution engine, stored in the trie under key = address bytes. Never
/// destroyed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Number of transactions originated by this account.
    pub nonce: u64,
    /// Balance in base units.
    pub balance: u64,
    /// Digest of the contract code, if any.
    pub code_hash: Option<Hash>,
    /// Raw contract code bytes, if any.
    pub code: Option<Vec<u8>>,
    /// Contract storage. Unused by the core engine, reserved for future
    /// contract execution; ordered so the codec stays deterministic.
    pub storage: BTreeMap<String, String>,
    /// Whether this is an externally-owned account (no code).
    pub is_eoa: bool,
}

impl Account {
    /// A fresh externally-owned account.
    pub fn new_eoa() -> Self {
        Self {
            is_eoa: true,
            ..Default::default()
        }
    }

    /// A fresh contract account holding `code`.
    pub fn new_contract(code: Vec<u8>) -> Self {
        Self {
            code_hash: Some(keccak256(&code)),
            code: Some(code),
            storage: BTreeMap::new(),
            is_eoa: false,
            ..Default::default()
        }
    }

    /// True if the account carries non-empty code.
    pub fn has_code(&self) -> bool {
        self.code.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Deterministic byte encoding (canonical field order, fixed-width
    /// integers, ordered storage map).
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(|e| CodecError::Account(e.to_string()))
    }

    /// Decode an account record.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Account(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_roundtrip() {
        let mut storage = BTreeMap::new();
        storage.insert("slot0".to_string(), "value0".to_string());

        let account = Account {
            nonce: 7,
            balance: 1_000_000,
            code_hash: Some([0xAB; 32]),
            code: Some(vec![0x60, 0x80]),
            storage,
            is_eoa: false,
        };

        let bytes = account.encode().unwrap();
        let decoded = Account::decode(&bytes).unwrap();
        assert_eq!(decoded, account);
    }

    #[test]
    fn test_account_encoding_deterministic() {
        let make = || Account {
            nonce: 3,
            balance: 42,
            ..Account::new_eoa()
        };
        assert_eq!(make().encode().unwrap(), make().encode().unwrap());
    }

    #[test]
    fn test_default_account_is_zero() {
        let account = Account::default();
        assert_eq!(account.nonce, 0);
        assert_eq!(account.balance, 0);
        assert!(account.code.is_none());
        assert!(!account.has_code());
    }

    #[test]
    fn test_decode_garbage_fails() {
        // A length prefix pointing far past the end of the buffer.
        let result = Account::decode(&[0xFF; 3]);
        assert!(result.is_err());
    }

    #[test]
    fn test_contract_account_code_hash() {
        let code = vec![1, 2, 3, 4];
        let account = Account::new_contract(code.clone());
        assert_eq!(account.code_hash, Some(keccak256(&code)));
        assert!(!account.is_eoa);
        assert!(account.has_code());
    }

    #[test]
    fn test_address_from_known_secret() {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let address = address_from_secret(&secret).unwrap();

        let keypair = KeyPair::from_secret_bytes(&secret).unwrap();
        let expected = address_from_public_key(&keypair.public_key_uncompressed());
        assert_eq!(address, expected);
    }

    #[test]
    fn test_contract_address_depends_on_nonce() {
        let sender = [0x11; 20];
        assert_ne!(contract_address(&sender, 0), contract_address(&sender, 1));
    }
}
