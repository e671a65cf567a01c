//! # shared-types
//!
//! Core value types shared across the Ember-Chain workspace.
//!
//! ## Clusters
//!
//! - **Identity**: `Hash`, `Address` and the derivations between public
//!   keys, secret keys and addresses
//! - **State**: `Account` with its deterministic byte codec
//! - **Wire**: the RLP encoder/decoder and `SignedTransaction` with
//!   canonical signing and identity hashes
//!
//! Every byte-level encoding used by more than one subsystem lives here so
//! that the trie, the pool and the execution engine never disagree on what
//! a record looks like.

pub mod entities;
pub mod errors;
pub mod rlp;
pub mod transaction;

pub use entities::{
    address_from_public_key, address_from_secret, contract_address, Account, Address, Hash,
    ADDRESS_LENGTH, HASH_LENGTH, ZERO_ADDRESS,
};
pub use errors::{CodecError, TxError};
pub use transaction::SignedTransaction;

// Re-export U256 from primitive-types for use across all subsystems.
pub use primitive_types::U256;
