//! In-memory implementation of the LedgerClient trait.
//!
//! This is primarily for testing. It enforces the node-side rules this crate
//! relies on (signatures, validity windows, fees, balances, groups, leases)
//! and confirms pooled transactions whenever a new round is produced.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use notary_core::{
    Address, GroupId, PendingTransaction, SignedTransaction, TransactionParams, TxId,
};

use crate::client::{AccountInfo, LedgerClient, NodeStatus};
use crate::error::{LedgerError, Result};

/// Network parameters of a [`MemoryLedger`].
#[derive(Debug, Clone)]
pub struct MemoryLedgerConfig {
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
    pub min_fee: u64,
    /// Per-byte fee suggested to clients.
    pub fee_per_byte: u64,
    /// Balance every funded account must keep.
    pub min_balance: u64,
    /// Number of rounds a transaction stays valid for.
    pub validity_window: u64,
}

impl Default for MemoryLedgerConfig {
    fn default() -> Self {
        Self {
            genesis_id: "memnet-v1".into(),
            genesis_hash: *blake3::hash(b"memnet-v1").as_bytes(),
            min_fee: 1_000,
            fee_per_byte: 0,
            min_balance: 100_000,
            validity_window: 1_000,
        }
    }
}

/// In-memory ledger.
///
/// Thread-safe via Mutex. All state is lost when the ledger is dropped.
pub struct MemoryLedger {
    config: MemoryLedgerConfig,
    inner: Mutex<MemoryLedgerInner>,
}

#[derive(Default)]
struct MemoryLedgerInner {
    round: u64,
    balances: HashMap<Address, u64>,
    /// Accepted, not yet confirmed.
    pool: Vec<TxId>,
    txns: HashMap<TxId, PendingTransaction>,
    /// Confirmation order.
    confirmed: Vec<TxId>,
    /// (sender, lease) -> last valid round of the holder.
    leases: HashMap<(Address, [u8; 32]), u64>,
    stalled: bool,
    fail_next: bool,
}

impl MemoryLedger {
    /// Create an empty ledger at round 1.
    pub fn new(config: MemoryLedgerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(MemoryLedgerInner {
                round: 1,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryLedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &MemoryLedgerConfig {
        &self.config
    }

    /// Credit an account out of thin air (genesis allocation).
    pub fn fund(&self, address: &Address, amount: u64) {
        let mut inner = self.lock();
        let balance = inner.balances.entry(*address).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Current balance of an account.
    pub fn balance(&self, address: &Address) -> u64 {
        self.lock().balances.get(address).copied().unwrap_or(0)
    }

    /// Last committed round.
    pub fn round(&self) -> u64 {
        self.lock().round
    }

    /// Keep producing rounds but stop including pooled transactions.
    pub fn stall(&self) {
        self.lock().stalled = true;
    }

    /// Resume including pooled transactions.
    pub fn resume(&self) {
        self.lock().stalled = false;
    }

    /// Evict every pooled transaction with the given pool error.
    ///
    /// Evicted transactions never take effect: their balance changes are
    /// reversed and their leases released.
    pub fn evict_pool(&self, reason: &str) {
        let mut inner = self.lock();
        let pool = std::mem::take(&mut inner.pool);
        for id in pool {
            let Some(pending) = inner.txns.get_mut(&id) else {
                continue;
            };
            pending.pool_error = reason.to_owned();
            let txn = pending.txn.txn.clone();

            if let Some(balance) = inner.balances.get_mut(txn.receiver()) {
                *balance = balance.saturating_sub(txn.amount());
            }
            let refund = txn.amount().saturating_add(txn.fee());
            let sender = inner.balances.entry(*txn.sender()).or_insert(0);
            *sender = sender.saturating_add(refund);

            if let Some(lease) = txn.lease() {
                inner.leases.remove(&(*txn.sender(), *lease));
            }
        }
    }

    /// Make the next client request fail with a transport error.
    pub fn fail_next_request(&self) {
        self.lock().fail_next = true;
    }

    /// Confirmed transactions, in confirmation order.
    pub fn confirmed_transactions(&self) -> Vec<SignedTransaction> {
        let inner = self.lock();
        inner
            .confirmed
            .iter()
            .filter_map(|id| inner.txns.get(id))
            .map(|p| p.txn.clone())
            .collect()
    }

    /// Number of transactions ever accepted into the pool.
    pub fn accepted_count(&self) -> usize {
        self.lock().txns.len()
    }

    fn check_transport(inner: &mut MemoryLedgerInner) -> Result<()> {
        if std::mem::take(&mut inner.fail_next) {
            return Err(LedgerError::Network("injected transport failure".into()));
        }
        Ok(())
    }

    fn produce_block(inner: &mut MemoryLedgerInner) {
        inner.round += 1;
        if inner.stalled {
            return;
        }
        let round = inner.round;
        let pool = std::mem::take(&mut inner.pool);
        for id in pool {
            if let Some(pending) = inner.txns.get_mut(&id) {
                pending.confirmed_round = Some(round);
                inner.confirmed.push(id);
            }
        }
    }

    /// Validate a transaction against `balances` and apply its effects there.
    fn check_and_apply(
        &self,
        inner: &MemoryLedgerInner,
        balances: &mut HashMap<Address, u64>,
        stxn: &SignedTransaction,
    ) -> std::result::Result<(), String> {
        let txn = &stxn.txn;
        let current = inner.round + 1;

        stxn.verify().map_err(|_| "invalid signature".to_owned())?;

        if txn.genesis_id() != self.config.genesis_id
            || txn.genesis_hash() != &self.config.genesis_hash
        {
            return Err("genesis mismatch".into());
        }
        if current < txn.first_valid() {
            return Err(format!("not valid until round {}", txn.first_valid()));
        }
        if current > txn.last_valid() {
            return Err(format!("txn dead: round {} outside {}..={}", current, txn.first_valid(), txn.last_valid()));
        }
        if txn.fee() < self.config.min_fee {
            return Err(format!("fee {} below minimum {}", txn.fee(), self.config.min_fee));
        }
        if inner.txns.contains_key(&stxn.id()) {
            return Err("transaction already in ledger".into());
        }
        if let Some(lease) = txn.lease() {
            if let Some(&held_until) = inner.leases.get(&(*txn.sender(), *lease)) {
                if held_until >= current {
                    return Err("lease in use".into());
                }
            }
        }

        let sender_balance = balances.get(txn.sender()).copied().unwrap_or(0);
        let debit = txn
            .amount()
            .checked_add(txn.fee())
            .ok_or_else(|| "amount overflow".to_owned())?;
        let sender_after = sender_balance
            .checked_sub(debit)
            .ok_or_else(|| format!("overspend: balance {} needs {}", sender_balance, debit))?;
        balances.insert(*txn.sender(), sender_after);

        let receiver_after = balances
            .get(txn.receiver())
            .copied()
            .unwrap_or(0)
            .saturating_add(txn.amount());
        balances.insert(*txn.receiver(), receiver_after);

        let sender_final = balances.get(txn.sender()).copied().unwrap_or(0);
        if sender_final < self.config.min_balance {
            return Err(format!(
                "sender balance {} below minimum {}",
                sender_final, self.config.min_balance
            ));
        }
        if receiver_after < self.config.min_balance {
            return Err(format!(
                "receiver balance {} below minimum {}",
                receiver_after, self.config.min_balance
            ));
        }
        Ok(())
    }

    fn accept(inner: &mut MemoryLedgerInner, stxn: SignedTransaction) -> TxId {
        let id = stxn.id();
        if let Some(lease) = stxn.txn.lease() {
            inner
                .leases
                .insert((*stxn.txn.sender(), *lease), stxn.txn.last_valid());
        }
        inner.pool.push(id);
        inner.txns.insert(
            id,
            PendingTransaction {
                txn: stxn,
                confirmed_round: None,
                pool_error: String::new(),
            },
        );
        id
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new(MemoryLedgerConfig::default())
    }
}

fn rejected(reason: impl std::fmt::Display) -> LedgerError {
    LedgerError::SubmissionRejected(reason.to_string())
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    async fn suggested_params(&self) -> Result<TransactionParams> {
        let mut inner = self.lock();
        Self::check_transport(&mut inner)?;
        Ok(TransactionParams {
            fee: self.config.fee_per_byte,
            min_fee: self.config.min_fee,
            flat_fee: false,
            first_valid: inner.round,
            last_valid: inner.round + self.config.validity_window,
            genesis_id: self.config.genesis_id.clone(),
            genesis_hash: self.config.genesis_hash,
        })
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxId> {
        let mut inner = self.lock();
        Self::check_transport(&mut inner)?;

        let stxn = SignedTransaction::from_bytes(raw).map_err(rejected)?;
        if stxn.txn.group().is_some() {
            return Err(rejected("grouped transaction submitted alone"));
        }

        let mut balances = inner.balances.clone();
        self.check_and_apply(&inner, &mut balances, &stxn)
            .map_err(|reason| rejected(format!("transaction {}: {}", stxn.id(), reason)))?;

        inner.balances = balances;
        Ok(Self::accept(&mut inner, stxn))
    }

    async fn send_raw_group(&self, raws: &[Vec<u8>]) -> Result<Vec<TxId>> {
        let mut inner = self.lock();
        Self::check_transport(&mut inner)?;

        let members = raws
            .iter()
            .map(|raw| SignedTransaction::from_bytes(raw))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(rejected)?;
        if members.is_empty() {
            return Err(rejected("empty group"));
        }

        let ungrouped: Vec<TxId> = members.iter().map(|m| m.txn.without_group().id()).collect();
        let expected = GroupId::compute(&ungrouped);
        if members.iter().any(|m| m.txn.group() != Some(&expected)) {
            return Err(rejected("group id mismatch"));
        }

        let mut balances = inner.balances.clone();
        for stxn in &members {
            self.check_and_apply(&inner, &mut balances, stxn)
                .map_err(|reason| rejected(format!("transaction {}: {}", stxn.id(), reason)))?;
        }

        inner.balances = balances;
        Ok(members
            .into_iter()
            .map(|stxn| Self::accept(&mut inner, stxn))
            .collect())
    }

    async fn account_info(&self, address: &Address) -> Result<AccountInfo> {
        let mut inner = self.lock();
        Self::check_transport(&mut inner)?;
        Ok(AccountInfo {
            address: *address,
            amount: inner.balances.get(address).copied().unwrap_or(0),
            min_balance: self.config.min_balance,
        })
    }

    async fn pending_transaction(&self, tx_id: &TxId) -> Result<PendingTransaction> {
        let mut inner = self.lock();
        Self::check_transport(&mut inner)?;
        inner
            .txns
            .get(tx_id)
            .cloned()
            .ok_or(LedgerError::TransactionNotFound(*tx_id))
    }

    async fn status(&self) -> Result<NodeStatus> {
        let mut inner = self.lock();
        Self::check_transport(&mut inner)?;
        Ok(NodeStatus {
            last_round: inner.round,
        })
    }

    async fn status_after_block(&self, round: u64) -> Result<NodeStatus> {
        let mut inner = self.lock();
        Self::check_transport(&mut inner)?;
        while inner.round <= round {
            Self::produce_block(&mut inner);
        }
        Ok(NodeStatus {
            last_round: inner.round,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notary_core::{Keypair, PaymentBuilder};

    fn funded() -> (MemoryLedger, Keypair, Address) {
        let ledger = MemoryLedger::default();
        let kp = Keypair::from_seed(&[1; 32]);
        let addr = Address::from_public_key(kp.public_key());
        ledger.fund(&addr, 10_000_000);
        (ledger, kp, addr)
    }

    async fn pay(ledger: &MemoryLedger, kp: &Keypair, to: Address, amount: u64) -> Result<TxId> {
        let params = ledger.suggested_params().await?;
        let from = Address::from_public_key(kp.public_key());
        let txn = PaymentBuilder::new(from, to, amount, params).build()?;
        ledger.send_raw_transaction(&txn.sign(kp).to_bytes()).await
    }

    #[tokio::test]
    async fn test_payment_confirms_on_next_round() {
        let (ledger, kp, _) = funded();
        let to = Address::from_public_key(Keypair::from_seed(&[2; 32]).public_key());

        let id = pay(&ledger, &kp, to, 500_000).await.unwrap();
        assert!(!ledger.pending_transaction(&id).await.unwrap().is_confirmed());

        let round = ledger.status().await.unwrap().last_round;
        ledger.status_after_block(round).await.unwrap();

        let pending = ledger.pending_transaction(&id).await.unwrap();
        assert_eq!(pending.confirmed_round, Some(round + 1));
        assert_eq!(ledger.balance(&to), 500_000);
    }

    #[tokio::test]
    async fn test_rejects_bad_signature() {
        let (ledger, _, addr) = funded();
        let params = ledger.suggested_params().await.unwrap();
        let txn = PaymentBuilder::new(addr, addr, 0, params).build().unwrap();
        let forged = txn.sign(&Keypair::from_seed(&[9; 32]));

        let err = ledger.send_raw_transaction(&forged.to_bytes()).await.unwrap_err();
        assert!(matches!(err, LedgerError::SubmissionRejected(ref r) if r.contains("signature")));
    }

    #[tokio::test]
    async fn test_rejects_overspend_and_below_min_balance() {
        let (ledger, kp, _) = funded();
        let to = Address::from_public_key(Keypair::from_seed(&[2; 32]).public_key());

        assert!(pay(&ledger, &kp, to, 20_000_000).await.is_err());
        // Receiver would end below the minimum balance
        assert!(pay(&ledger, &kp, to, 10).await.is_err());
        assert_eq!(ledger.accepted_count(), 0);
    }

    #[tokio::test]
    async fn test_rejects_duplicate() {
        let (ledger, kp, addr) = funded();
        let params = ledger.suggested_params().await.unwrap();
        let raw = PaymentBuilder::new(addr, addr, 0, params)
            .build()
            .unwrap()
            .sign(&kp)
            .to_bytes();

        ledger.send_raw_transaction(&raw).await.unwrap();
        assert!(ledger.send_raw_transaction(&raw).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_expired() {
        let (ledger, kp, addr) = funded();
        let mut params = ledger.suggested_params().await.unwrap();
        params.last_valid = params.first_valid;
        let txn = PaymentBuilder::new(addr, addr, 0, params).build().unwrap();
        ledger.status_after_block(ledger.round()).await.unwrap();

        let err = ledger
            .send_raw_transaction(&txn.sign(&kp).to_bytes())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::SubmissionRejected(ref r) if r.contains("dead")));
    }

    #[tokio::test]
    async fn test_stall_produces_rounds_without_confirming() {
        let (ledger, kp, addr) = funded();
        ledger.stall();
        let id = pay(&ledger, &kp, addr, 0).await.unwrap();
        for _ in 0..3 {
            ledger.status_after_block(ledger.round()).await.unwrap();
        }
        assert!(!ledger.pending_transaction(&id).await.unwrap().is_confirmed());

        ledger.resume();
        ledger.status_after_block(ledger.round()).await.unwrap();
        assert!(ledger.pending_transaction(&id).await.unwrap().is_confirmed());
    }

    #[tokio::test]
    async fn test_eviction_reverses_balances() {
        let (ledger, kp, from) = funded();
        let to = Address::from_public_key(Keypair::from_seed(&[2; 32]).public_key());
        ledger.fund(&to, 200_000);

        let id = pay(&ledger, &kp, to, 1_500_000).await.unwrap();
        assert_eq!(ledger.balance(&to), 1_700_000);

        ledger.evict_pool("congestion");
        assert_eq!(ledger.balance(&from), 10_000_000);
        assert_eq!(ledger.balance(&to), 200_000);
        assert_eq!(ledger.pending_transaction(&id).await.unwrap().pool_error, "congestion");

        // Nothing left in the pool to confirm.
        ledger.status_after_block(ledger.round()).await.unwrap();
        assert!(!ledger.pending_transaction(&id).await.unwrap().is_confirmed());
        assert!(ledger.confirmed_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let ledger = MemoryLedger::default();
        ledger.fail_next_request();
        assert!(matches!(ledger.status().await, Err(LedgerError::Network(_))));
        assert!(ledger.status().await.is_ok());
    }
}
