use ember_state::StateError;
use shared_types::{Address, U256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VmError {
    #[error("invalid transaction: {0}")]
    InvalidTransaction(&'static str),

    #[error("could not recover transaction sender")]
    InvalidSender,

    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: U256, available: u64 },

    #[error("address collision: account already exists at {}", hex::encode(.address))]
    AddressCollision { address: Address },

    #[error("mint limit exceeded for {}", hex::encode(.address))]
    MintLimitExceeded { address: Address },

    #[error(transparent)]
    State(#[from] StateError),
}
