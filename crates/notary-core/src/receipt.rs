//! Confirmation receipts.

use crate::address::Address;
use crate::transaction::{SignedTransaction, Transaction, TxId};

/// A node's view of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    /// The transaction as the node holds it.
    pub txn: SignedTransaction,
    /// Round the transaction was confirmed in, if any.
    pub confirmed_round: Option<u64>,
    /// Non-empty when the node evicted the transaction from its pool.
    pub pool_error: String,
}

impl PendingTransaction {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_round.is_some()
    }
}

/// Result of a confirmed submission.
///
/// Carries the confirmed transaction id and round together with the raw
/// confirmation payload the node returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_id: TxId,
    pub confirmed_round: u64,
    pub raw: PendingTransaction,
}

impl Receipt {
    /// The confirmed transaction.
    pub fn transaction(&self) -> &Transaction {
        &self.raw.txn.txn
    }

    pub fn sender(&self) -> &Address {
        self.transaction().sender()
    }

    pub fn receiver(&self) -> &Address {
        self.transaction().receiver()
    }

    pub fn amount(&self) -> u64 {
        self.transaction().amount()
    }
}
