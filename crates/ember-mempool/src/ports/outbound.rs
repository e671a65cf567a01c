use crate::domain::errors::MempoolError;
use shared_types::Address;

/// Read-only view of account state, as much of it as admission needs.
///
/// The pool uses this to learn a sender's current trie-persisted nonce
/// (the executable frontier is one above it). Implementations must treat
/// unknown accounts as nonce zero.
pub trait AccountReader: Send + Sync {
    fn account_nonce(&self, address: &Address) -> Result<u64, MempoolError>;
}
