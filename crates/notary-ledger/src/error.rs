//! Error types for the ledger layer.

use notary_core::{Address, CoreError, TxId};
use thiserror::Error;

/// Errors that can occur while talking to a ledger node or managing accounts.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Entropy source failed while generating a key. Fatal.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Transport failure talking to the ledger node.
    #[error("network error: {0}")]
    Network(String),

    /// Receiver or account address is not a valid address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The transaction could not be built or encoded.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// A transaction was handed to an account that is not its sender.
    #[error("transaction sender {expected} cannot be signed by {got}")]
    WrongSigner { expected: Address, got: Address },

    /// The node refused the transaction. Rebuild with fresh parameters to retry.
    #[error("submission rejected: {0}")]
    SubmissionRejected(String),

    /// Submitted but not observed confirmed within the wait budget.
    ///
    /// The outcome is ambiguous; re-query before resubmitting.
    #[error("transaction {tx_id} not confirmed after {rounds} rounds")]
    ConfirmationTimeout { tx_id: TxId, rounds: u64 },

    /// The node has no record of the transaction.
    #[error("transaction not found: {0}")]
    TransactionNotFound(TxId),

    /// The funding source cannot cover a required top-up.
    #[error("funder {funder} has {available} spendable, needs {needed}")]
    InsufficientFunderBalance {
        funder: Address,
        needed: u64,
        available: u64,
    },

    /// An atomic group is empty or too large.
    #[error("invalid group: {0}")]
    InvalidGroup(String),
}

impl LedgerError {
    /// Whether re-running the failed step (with fresh parameters) may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::Network(_) | LedgerError::ConfirmationTimeout { .. }
        )
    }
}

impl From<CoreError> for LedgerError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::KeyGeneration(msg) => LedgerError::KeyGeneration(msg),
            CoreError::InvalidAddress(msg) => LedgerError::InvalidAddress(msg),
            other => LedgerError::InvalidTransaction(other.to_string()),
        }
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
