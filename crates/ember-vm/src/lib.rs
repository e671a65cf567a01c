//! # ember-vm
//!
//! The state transition engine: validates signed transactions and applies
//! them to the trie-backed account state, plus a capped faucet for seeding
//! balances.
//!
//! ## Accounting
//!
//! A successful transaction charges its sender
//! `gas_price * gas_limit + value` (the full gas allowance, no refund for
//! unused gas) and bumps the sender nonce by one. Transfers credit the
//! recipient with `value`; contract creations give the new account the
//! value as its starting balance and record the code bytes.
//!
//! ## What the engine does not do
//!
//! - It never checks `tx.nonce` against the account nonce; the pool feeds
//!   it transactions in sender-nonce order.
//! - It does not interpret contract code. Calling an account that has code
//!   transfers value and stops there.
//!
//! All reads happen before any write, so a rejected transaction leaves the
//! state root untouched.

pub mod errors;
pub mod executor;

pub use errors::VmError;
pub use executor::{Vm, MINT_AMOUNT, MINT_LIMIT};
