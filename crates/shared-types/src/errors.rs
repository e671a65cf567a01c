use crate::rlp::RlpError;
use thiserror::Error;

/// Errors raised by the byte codecs for state records.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed account record: {0}")]
    Account(String),
}

/// Errors raised by transaction signing, recovery and the wire codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TxError {
    #[error("invalid signing key")]
    KeyInvalid,

    #[error("invalid signature: {0}")]
    SignatureInvalid(&'static str),

    #[error("malformed transaction: {0}")]
    Malformed(&'static str),

    #[error("malformed transaction encoding: {0}")]
    Rlp(#[from] RlpError),
}
