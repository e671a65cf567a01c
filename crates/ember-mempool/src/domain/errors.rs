use ember_state::StateError;
use shared_types::U256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MempoolError {
    #[error("nonce too low: transaction nonce {nonce}, account nonce {current}")]
    NonceTooLow { nonce: u64, current: u64 },

    #[error("invalid signature: {0}")]
    SignatureInvalid(String),

    #[error("replacement underpriced: old price {old}, new price {new}, minimum bump {min_bump_percent}%")]
    ReplaceUnderpriced {
        old: U256,
        new: U256,
        min_bump_percent: u64,
    },

    #[error("account state read failed: {0}")]
    State(String),

    #[error("journal error: {0}")]
    Journal(String),
}

impl From<StateError> for MempoolError {
    fn from(err: StateError) -> Self {
        MempoolError::State(err.to_string())
    }
}
