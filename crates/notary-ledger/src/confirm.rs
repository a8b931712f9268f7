//! Confirmation wait: a bounded polling loop against the ledger node.

use std::time::Duration;

use notary_core::{Receipt, TxId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::LedgerClient;
use crate::error::{LedgerError, Result};

/// How long to wait for a submitted transaction to confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationPolicy {
    /// Rounds to wait before giving up.
    pub max_rounds: u64,
    /// Pause between polls, in addition to waiting for the next round.
    pub poll_interval_ms: u64,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            poll_interval_ms: 0,
        }
    }
}

impl ConfirmationPolicy {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Block until `tx_id` is confirmed, the node reports a pool error, or
/// `policy.max_rounds` rounds pass.
///
/// The transaction is checked once up front and again after each round the
/// node commits, so a confirmation in the last round of the budget counts.
pub async fn wait_for_confirmation<C: LedgerClient + ?Sized>(
    client: &C,
    tx_id: &TxId,
    policy: &ConfirmationPolicy,
) -> Result<Receipt> {
    let mut round = client.status().await?.last_round;

    if let Some(receipt) = check_pending(client, tx_id).await? {
        return Ok(receipt);
    }

    for _ in 0..policy.max_rounds {
        debug!(tx_id = %tx_id, round, "waiting for confirmation");
        round = client.status_after_block(round).await?.last_round;

        if let Some(receipt) = check_pending(client, tx_id).await? {
            return Ok(receipt);
        }

        if policy.poll_interval_ms > 0 {
            tokio::time::sleep(policy.poll_interval()).await;
        }
    }

    warn!(tx_id = %tx_id, rounds = policy.max_rounds, "confirmation timed out");
    Err(LedgerError::ConfirmationTimeout {
        tx_id: *tx_id,
        rounds: policy.max_rounds,
    })
}

/// One look at the node's view of `tx_id`.
async fn check_pending<C: LedgerClient + ?Sized>(
    client: &C,
    tx_id: &TxId,
) -> Result<Option<Receipt>> {
    let pending = client.pending_transaction(tx_id).await?;

    if let Some(confirmed_round) = pending.confirmed_round {
        debug!(tx_id = %tx_id, round = confirmed_round, "transaction confirmed");
        return Ok(Some(Receipt {
            tx_id: *tx_id,
            confirmed_round,
            raw: pending,
        }));
    }

    if !pending.pool_error.is_empty() {
        warn!(tx_id = %tx_id, error = %pending.pool_error, "transaction evicted from pool");
        return Err(LedgerError::SubmissionRejected(format!(
            "transaction {}: {}",
            tx_id, pending.pool_error
        )));
    }

    Ok(None)
}
