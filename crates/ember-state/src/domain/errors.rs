use shared_types::Hash;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("malformed trie node: {0}")]
    MalformedNode(String),

    #[error("referenced node missing from store: {}", hex::encode(.hash))]
    MissingNode { hash: Hash },

    #[error("corrupt root pointer: expected 32 bytes, found {0}")]
    CorruptRootPointer(usize),

    #[error("malformed account record: {0}")]
    MalformedAccount(String),

    #[error("store error: {0}")]
    Store(String),
}

impl From<shared_types::rlp::RlpError> for StateError {
    fn from(err: shared_types::rlp::RlpError) -> Self {
        StateError::MalformedNode(err.to_string())
    }
}
