//! # ember-mempool
//!
//! The transaction pool: admits signed transactions, orders them per
//! sender by nonce and globally by gas price, and hands out the next
//! executable transaction.
//!
//! ## Structure
//!
//! Each sender has two holding areas:
//!
//! ```text
//! queue    nonce-indexed parking for transactions ahead of the
//!          executable frontier (a nonce gap exists below them)
//! pending  a chain of boxes starting at account.nonce + 1; each box is a
//!          run of consecutive nonces sharing a price floor
//! ```
//!
//! A global view sorted by head-box gas price (address as tiebreak) picks
//! the sender to draw from on extraction.
//!
//! The pool reads account nonces through the [`AccountReader`] port; it
//! never writes state.
//!
//! [`AccountReader`]: ports::outbound::AccountReader

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{TrieAccountReader, TxJournal};
pub use domain::entities::{PoolConfig, PoolTransaction, TxBox};
pub use domain::errors::MempoolError;
pub use domain::pool::TxPool;
pub use domain::value_objects::{PoolStatus, PricedBox};
pub use ports::outbound::AccountReader;
