//! Error types for Notary Core.

use thiserror::Error;

/// Core errors that can occur while building, encoding or signing transactions.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("note is {len} bytes, maximum is {max}")]
    NoteTooLarge { len: usize, max: usize },

    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
