//! # ember-state
//!
//! State storage for Ember-Chain: a Merkle Patricia Trie persisted to an
//! ordered key/value store, and the account database layered on top of it.
//!
//! ## Role in System
//!
//! - **Single Source of Truth**: authoritative current state of all accounts
//! - **Hash-addressed**: every trie node is stored under the Keccak-256 of
//!   its encoding, so equal state always produces equal root hashes
//! - **Lazy**: nodes are loaded from the store on demand during traversal
//!
//! ## Layers
//!
//! ```text
//! [StateDb]  account records (address -> Account bytes)
//!     │
//! [MerkleTrie]  nibble-path radix trie, path-copy updates
//!     │
//! [KvStore port]  MemoryStore | SledStore
//! ```
//!
//! The engine above (`ember-vm`) mutates accounts only through `StateDb`;
//! the pool (`ember-mempool`) reads account nonces through the same
//! interface.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{MemoryStore, SledStore};
pub use domain::cache::NodeCache;
pub use domain::errors::StateError;
pub use domain::nibbles::Nibbles;
pub use domain::node::{TrieNode, EMPTY_ROOT};
pub use domain::state::StateDb;
pub use domain::trie::MerkleTrie;
pub use ports::state::AccountStore;
pub use ports::store::KvStore;
