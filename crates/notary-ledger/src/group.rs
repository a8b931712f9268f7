//! Atomic groups: several transactions that confirm together or not at all.

use notary_core::{GroupId, Receipt, TxId};
use tracing::info;

use crate::account::TransactionWithSigner;
use crate::client::LedgerClient;
use crate::confirm::wait_for_confirmation;
use crate::error::{LedgerError, Result};

/// Largest number of transactions the ledger accepts in one group.
pub const MAX_GROUP_SIZE: usize = 16;

/// Outcome of a confirmed group.
#[derive(Debug, Clone)]
pub struct GroupReceipt {
    pub group: GroupId,
    /// Member ids, in submission order.
    pub tx_ids: Vec<TxId>,
    /// Receipt of the first member. All members share its round.
    pub receipt: Receipt,
}

/// Ordered set of transactions, each paired with its signer.
pub struct AtomicGroup<'a, C: LedgerClient> {
    members: Vec<TransactionWithSigner<'a, C>>,
}

impl<'a, C: LedgerClient> Default for AtomicGroup<'a, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, C: LedgerClient> AtomicGroup<'a, C> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Append a member.
    pub fn add(&mut self, member: TransactionWithSigner<'a, C>) -> Result<&mut Self> {
        if self.members.len() >= MAX_GROUP_SIZE {
            return Err(LedgerError::InvalidGroup(format!(
                "group is limited to {} transactions",
                MAX_GROUP_SIZE
            )));
        }
        if member.transaction().group().is_some() {
            return Err(LedgerError::InvalidGroup(
                "transaction is already assigned to a group".into(),
            ));
        }
        self.members.push(member);
        Ok(self)
    }

    /// Assign the group id, sign every member, submit them as one unit, and
    /// wait for confirmation.
    pub async fn submit(self) -> Result<GroupReceipt> {
        let first = match self.members.first() {
            Some(first) => first.signer(),
            None => return Err(LedgerError::InvalidGroup("empty group".into())),
        };

        let ungrouped: Vec<TxId> = self
            .members
            .iter()
            .map(|m| m.transaction().id())
            .collect();
        let group = GroupId::compute(&ungrouped);

        let mut raws = Vec::with_capacity(self.members.len());
        for member in &self.members {
            let grouped = member.transaction().in_group(group);
            raws.push(member.signer().sign(&grouped)?.to_bytes());
        }

        let client = first.client();
        let tx_ids = client.send_raw_group(&raws).await?;
        let lead = tx_ids
            .first()
            .copied()
            .ok_or_else(|| LedgerError::InvalidGroup("ledger returned no ids".into()))?;

        let receipt = wait_for_confirmation(client.as_ref(), &lead, first.confirmation()).await?;
        info!(
            size = tx_ids.len(),
            round = receipt.confirmed_round,
            "group confirmed"
        );

        Ok(GroupReceipt {
            group,
            tx_ids,
            receipt,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::account::{Account, PaymentExtras};
    use crate::memory::MemoryLedger;

    #[tokio::test]
    async fn test_group_confirms_all_members() {
        let ledger = Arc::new(MemoryLedger::default());
        let alice = Account::from_seed(&[1; 32], Arc::clone(&ledger));
        let bob = Account::from_seed(&[2; 32], Arc::clone(&ledger));
        ledger.fund(&alice.address(), 10_000_000);
        ledger.fund(&bob.address(), 10_000_000);

        let params = alice.current_params().await.unwrap();
        let mut group = AtomicGroup::new();
        group
            .add(
                alice
                    .build_payment(&bob, 1_000, Some(params.clone()), PaymentExtras::default())
                    .await
                    .unwrap(),
            )
            .unwrap();
        group
            .add(
                bob.build_payment(&alice, 2_000, Some(params), PaymentExtras::default())
                    .await
                    .unwrap(),
            )
            .unwrap();

        let receipt = group.submit().await.unwrap();
        assert_eq!(receipt.tx_ids.len(), 2);
        assert_eq!(receipt.receipt.transaction().group(), Some(&receipt.group));
        assert_eq!(ledger.confirmed_transactions().len(), 2);
    }

    #[tokio::test]
    async fn test_group_is_all_or_nothing() {
        let ledger = Arc::new(MemoryLedger::default());
        let alice = Account::from_seed(&[1; 32], Arc::clone(&ledger));
        let bob = Account::from_seed(&[2; 32], Arc::clone(&ledger));
        ledger.fund(&alice.address(), 10_000_000);

        let mut group = AtomicGroup::new();
        group
            .add(
                alice
                    .build_payment(&bob, 1_000_000, None, PaymentExtras::default())
                    .await
                    .unwrap(),
            )
            .unwrap();
        // Bob has nothing to send.
        group
            .add(
                bob.build_payment(&alice, 5_000_000, None, PaymentExtras::default())
                    .await
                    .unwrap(),
            )
            .unwrap();

        let err = group.submit().await.unwrap_err();
        assert!(matches!(err, LedgerError::SubmissionRejected(_)));
        assert_eq!(ledger.accepted_count(), 0);
        assert_eq!(ledger.balance(&alice.address()), 10_000_000);
    }

    #[tokio::test]
    async fn test_empty_group_rejected() {
        let group: AtomicGroup<'_, MemoryLedger> = AtomicGroup::new();
        assert!(matches!(
            group.submit().await,
            Err(LedgerError::InvalidGroup(_))
        ));
    }

    #[tokio::test]
    async fn test_group_size_limit() {
        let ledger = Arc::new(MemoryLedger::default());
        let alice = Account::from_seed(&[1; 32], Arc::clone(&ledger));
        let params = alice.current_params().await.unwrap();

        let mut group = AtomicGroup::new();
        for i in 0..MAX_GROUP_SIZE as u64 {
            let member = alice
                .build_payment(&alice, i, Some(params.clone()), PaymentExtras::default())
                .await
                .unwrap();
            group.add(member).unwrap();
        }
        let extra = alice
            .build_payment(&alice, 99, Some(params), PaymentExtras::default())
            .await
            .unwrap();
        assert!(group.add(extra).is_err());
    }
}
