//! # Signed Transactions
//!
//! The immutable signed-transaction value: canonical hashing, ECDSA
//! signing, sender recovery and the RLP wire format.
//!
//! ## Hashing
//!
//! Two hashes are derived from the same field encoding:
//!
//! - **Signing hash**: fields encoded with `(v, r, s)` zeroed. This is what
//!   the sender signs and what recovery reproduces.
//! - **Identity hash**: fields encoded with the signed `(v, r, s)`. This is
//!   the transaction's id in the pool and on the wire.
//!
//! ## Wire format
//!
//! An RLP list in the order
//! `nonce, gas_price, gas_limit, to, value, data, chain_id, v, r, s`,
//! with integers as minimal big-endian byte strings and an absent `to`
//! as the empty string.

use crate::entities::{address_from_public_key, Address, Hash, ADDRESS_LENGTH, ZERO_ADDRESS};
use crate::errors::TxError;
use crate::rlp;
use crate::U256;
use shared_crypto::{keccak256, recover_public_key, KeyPair, RecoverableSignature};

/// Recovery ids are offset by 27 in the `v` field, following the legacy
/// transaction convention.
const V_BASE: u64 = 27;

/// A transaction with an optional ECDSA signature.
///
/// A freshly constructed transaction has `(v, r, s)` zeroed; [`sign`]
/// fills them in. All other fields are fixed at construction.
///
/// [`sign`]: SignedTransaction::sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Sender's transaction count at submission time.
    pub nonce: u64,
    /// Price per unit of gas.
    pub gas_price: U256,
    /// Maximum gas this transaction may consume.
    pub gas_limit: u64,
    /// Recipient address; `None` for contract creation.
    pub to: Option<Address>,
    /// Transferred value in base units.
    pub value: U256,
    /// Call data, or contract code for creation transactions.
    pub data: Vec<u8>,
    /// Chain identifier, bound into the signing hash for replay protection.
    pub chain_id: U256,
    /// Recovery id plus 27; zero while unsigned.
    pub v: u64,
    /// Signature `r` scalar; zero while unsigned.
    pub r: U256,
    /// Signature `s` scalar; zero while unsigned.
    pub s: U256,
}

impl SignedTransaction {
    /// Create an unsigned transaction.
    pub fn new(
        nonce: u64,
        to: Option<Address>,
        value: U256,
        gas_limit: u64,
        gas_price: U256,
        data: Vec<u8>,
        chain_id: U256,
    ) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data,
            chain_id,
            v: 0,
            r: U256::zero(),
            s: U256::zero(),
        }
    }

    /// True once `sign` has filled in the signature triple.
    pub fn is_signed(&self) -> bool {
        !self.r.is_zero() || !self.s.is_zero()
    }

    /// True if this transaction creates a contract.
    ///
    /// Canonically signalled by `to = None`; the zero address combined with
    /// non-empty data is accepted as an equivalent legacy form.
    pub fn is_contract_creation(&self) -> bool {
        match self.to {
            None => true,
            Some(to) => to == ZERO_ADDRESS && !self.data.is_empty(),
        }
    }

    /// Total cost charged to the sender: `gas_price * gas_limit + value`.
    ///
    /// Saturates rather than overflowing; a saturated cost always exceeds
    /// any real balance, so it fails the balance check downstream.
    pub fn total_cost(&self) -> U256 {
        self.gas_price
            .saturating_mul(U256::from(self.gas_limit))
            .saturating_add(self.value)
    }

    /// The hash the sender signs: all fields with `(v, r, s)` zeroed.
    pub fn signing_hash(&self) -> Hash {
        keccak256(&self.encode_fields(false))
    }

    /// The transaction's identity: all fields including the signature.
    pub fn hash(&self) -> Hash {
        keccak256(&self.encode())
    }

    /// Sign with a 32-byte secret key, filling in `(v, r, s)`.
    ///
    /// # Errors
    /// `KeyInvalid` if the secret key is not a valid scalar.
    pub fn sign(&mut self, secret: &[u8; 32]) -> Result<(), TxError> {
        let keypair = KeyPair::from_secret_bytes(secret).map_err(|_| TxError::KeyInvalid)?;
        let signature = keypair
            .sign_prehash(&self.signing_hash())
            .map_err(|_| TxError::KeyInvalid)?;

        self.r = U256::from_big_endian(&signature.r);
        self.s = U256::from_big_endian(&signature.s);
        self.v = V_BASE + signature.recovery_id as u64;
        Ok(())
    }

    /// Recover the sender address from the signature.
    ///
    /// # Errors
    /// `SignatureInvalid` if the transaction is unsigned, the recovery id
    /// is out of range, or no public key matches the signature.
    pub fn recover_sender(&self) -> Result<Address, TxError> {
        if !self.is_signed() {
            return Err(TxError::SignatureInvalid("transaction is not signed"));
        }
        let recovery_id = self
            .v
            .checked_sub(V_BASE)
            .filter(|id| *id <= 1)
            .ok_or(TxError::SignatureInvalid("recovery id out of range"))?;

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        self.r.to_big_endian(&mut r);
        self.s.to_big_endian(&mut s);
        let signature = RecoverableSignature {
            r,
            s,
            recovery_id: recovery_id as u8,
        };

        let public_key = recover_public_key(&self.signing_hash(), &signature)
            .map_err(|_| TxError::SignatureInvalid("public key recovery failed"))?;
        Ok(address_from_public_key(&public_key))
    }

    /// Serialize to the wire format, signature included.
    pub fn encode(&self) -> Vec<u8> {
        self.encode_fields(true)
    }

    /// Deserialize from the wire format.
    ///
    /// # Errors
    /// `Malformed` / `Rlp` on anything that is not a well-formed ten-field
    /// transaction list.
    pub fn decode(bytes: &[u8]) -> Result<Self, TxError> {
        let items = rlp::decode_list(bytes)?;
        if items.len() != 10 {
            return Err(TxError::Malformed("expected a ten-field list"));
        }

        let to = match items[3].len() {
            0 => None,
            ADDRESS_LENGTH => {
                let mut address = [0u8; ADDRESS_LENGTH];
                address.copy_from_slice(&items[3]);
                Some(address)
            }
            _ => return Err(TxError::Malformed("recipient must be empty or 20 bytes")),
        };

        Ok(Self {
            nonce: rlp::decode_uint(&items[0])?,
            gas_price: rlp::decode_u256(&items[1])?,
            gas_limit: rlp::decode_uint(&items[2])?,
            to,
            value: rlp::decode_u256(&items[4])?,
            data: items[5].clone(),
            chain_id: rlp::decode_u256(&items[6])?,
            v: rlp::decode_uint(&items[7])?,
            r: rlp::decode_u256(&items[8])?,
            s: rlp::decode_u256(&items[9])?,
        })
    }

    fn encode_fields(&self, with_signature: bool) -> Vec<u8> {
        let to_bytes = match &self.to {
            Some(address) => address.to_vec(),
            None => Vec::new(),
        };
        let (v, r, s) = if with_signature {
            (
                rlp::uint_bytes(self.v),
                rlp::u256_bytes(&self.r),
                rlp::u256_bytes(&self.s),
            )
        } else {
            (Vec::new(), Vec::new(), Vec::new())
        };

        rlp::encode_list_items(&[
            rlp::uint_bytes(self.nonce),
            rlp::u256_bytes(&self.gas_price),
            rlp::uint_bytes(self.gas_limit),
            to_bytes,
            rlp::u256_bytes(&self.value),
            self.data.clone(),
            rlp::u256_bytes(&self.chain_id),
            v,
            r,
            s,
        ])
    }
}
