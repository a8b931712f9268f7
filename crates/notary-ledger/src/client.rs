//! LedgerClient trait: the abstract interface to a ledger node.
//!
//! Accounts, the funding guarantor and the orchestrator only see this trait.
//! Implementations include a remote node client supplied by the caller and
//! [`MemoryLedger`](crate::memory::MemoryLedger) for tests.

use async_trait::async_trait;
use notary_core::{Address, PendingTransaction, TransactionParams, TxId};

use crate::error::Result;

/// Balance information for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: Address,
    /// Total balance in micro units.
    pub amount: u64,
    /// Balance the account must keep; not spendable.
    pub min_balance: u64,
}

impl AccountInfo {
    /// Balance available for payments and fees.
    pub fn spendable(&self) -> u64 {
        self.amount.saturating_sub(self.min_balance)
    }

    /// How much must be added for the spendable balance to reach `target`.
    ///
    /// Accounts whose balance is below their minimum count as negative
    /// spendable, so the shortfall includes the missing minimum.
    pub fn shortfall(&self, target: u64) -> u64 {
        target
            .saturating_add(self.min_balance)
            .saturating_sub(self.amount)
    }
}

/// Node status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStatus {
    /// Last round the node has committed.
    pub last_round: u64,
}

/// The LedgerClient trait: async interface to a ledger node.
///
/// A handle is configured (endpoint, credentials) by the caller and shared
/// read-only by every component of a pipeline run.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch current suggested transaction parameters.
    async fn suggested_params(&self) -> Result<TransactionParams>;

    /// Submit a signed transaction in wire form.
    ///
    /// Returns `SubmissionRejected` when the node refuses it.
    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxId>;

    /// Submit an atomic group; either every member is accepted or none.
    async fn send_raw_group(&self, raws: &[Vec<u8>]) -> Result<Vec<TxId>>;

    /// Query the balance of an account.
    async fn account_info(&self, address: &Address) -> Result<AccountInfo>;

    /// Query the confirmation status of a submitted transaction.
    async fn pending_transaction(&self, tx_id: &TxId) -> Result<PendingTransaction>;

    /// Current node status.
    async fn status(&self) -> Result<NodeStatus>;

    /// Wait until the node has committed a round after `round`.
    async fn status_after_block(&self, round: u64) -> Result<NodeStatus>;
}
