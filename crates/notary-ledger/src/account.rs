//! Accounts: a signing identity bound to a ledger client.
//!
//! Building a transaction is separate from signing and submitting it, so an
//! account can act as a pure signer inside an [`AtomicGroup`](crate::group::AtomicGroup).

use std::fmt;
use std::sync::Arc;

use notary_core::{
    Address, Keypair, PaymentBuilder, Receipt, SignedTransaction, Transaction, TransactionParams,
};
use tracing::{debug, info};

use crate::client::{AccountInfo, LedgerClient};
use crate::confirm::{wait_for_confirmation, ConfirmationPolicy};
use crate::error::{LedgerError, Result};

/// Anything that names a payment receiver.
pub trait ToAddress {
    fn to_address(&self) -> Result<Address>;
}

impl ToAddress for Address {
    fn to_address(&self) -> Result<Address> {
        Ok(*self)
    }
}

impl ToAddress for &Address {
    fn to_address(&self) -> Result<Address> {
        Ok(**self)
    }
}

impl ToAddress for &str {
    fn to_address(&self) -> Result<Address> {
        Ok(self.parse::<Address>()?)
    }
}

impl ToAddress for String {
    fn to_address(&self) -> Result<Address> {
        Ok(self.parse::<Address>()?)
    }
}

impl<C: LedgerClient> ToAddress for &Account<C> {
    fn to_address(&self) -> Result<Address> {
        Ok(self.address())
    }
}

/// Optional payment fields beyond receiver and amount.
#[derive(Debug, Clone, Default)]
pub struct PaymentExtras {
    /// Memo bytes.
    pub note: Option<Vec<u8>>,
    /// Lease guarding against duplicate intent.
    pub lease: Option<[u8; 32]>,
    /// Absolute fee instead of the per-byte estimate.
    pub flat_fee: Option<u64>,
}

impl PaymentExtras {
    /// Extras carrying only a note.
    pub fn with_note(note: impl Into<Vec<u8>>) -> Self {
        Self {
            note: Some(note.into()),
            ..Default::default()
        }
    }
}

/// A signing identity.
///
/// The account exclusively owns its key; the key is never copied out
/// except by an explicit [`Account::export_seed`].
pub struct Account<C: LedgerClient> {
    keypair: Keypair,
    address: Address,
    client: Arc<C>,
    confirmation: ConfirmationPolicy,
}

impl<C: LedgerClient> Account<C> {
    /// Generate a fresh account.
    pub fn create(client: Arc<C>) -> Result<Self> {
        let keypair = Keypair::generate()?;
        Ok(Self::from_keypair(keypair, client))
    }

    /// Import an existing key.
    pub fn from_keypair(keypair: Keypair, client: Arc<C>) -> Self {
        let address = Address::from_public_key(keypair.public_key());
        Self {
            keypair,
            address,
            client,
            confirmation: ConfirmationPolicy::default(),
        }
    }

    /// Import from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32], client: Arc<C>) -> Self {
        Self::from_keypair(Keypair::from_seed(seed), client)
    }

    /// Use a different confirmation wait policy.
    pub fn with_confirmation(mut self, policy: ConfirmationPolicy) -> Self {
        self.confirmation = policy;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn confirmation(&self) -> &ConfirmationPolicy {
        &self.confirmation
    }

    /// Secret seed, for persisting the key outside this process.
    pub fn export_seed(&self) -> [u8; 32] {
        self.keypair.seed()
    }

    /// Current balance information.
    pub async fn info(&self) -> Result<AccountInfo> {
        self.client.account_info(&self.address).await
    }

    /// Fetch current transaction parameters. Not retried.
    pub async fn current_params(&self) -> Result<TransactionParams> {
        self.client.suggested_params().await
    }

    /// Build an unsigned payment from this account.
    ///
    /// Parameters are fetched when `params` is `None`.
    pub async fn build_payment(
        &self,
        receiver: impl ToAddress,
        amount: u64,
        params: Option<TransactionParams>,
        extras: PaymentExtras,
    ) -> Result<TransactionWithSigner<'_, C>> {
        let receiver = receiver.to_address()?;
        let params = match params {
            Some(params) => params,
            None => self.current_params().await?,
        };

        let mut builder = PaymentBuilder::new(self.address, receiver, amount, params);
        if let Some(note) = extras.note {
            builder = builder.note(note);
        }
        if let Some(lease) = extras.lease {
            builder = builder.lease(lease);
        }
        if let Some(fee) = extras.flat_fee {
            builder = builder.flat_fee(fee);
        }

        let txn = builder.build()?;
        Ok(TransactionWithSigner { txn, signer: self })
    }

    /// Sign a transaction sent from this account.
    pub fn sign(&self, txn: &Transaction) -> Result<SignedTransaction> {
        if txn.sender() != &self.address {
            return Err(LedgerError::WrongSigner {
                expected: *txn.sender(),
                got: self.address,
            });
        }
        Ok(txn.sign(&self.keypair))
    }

    /// Sign, submit, and block until the transaction is confirmed.
    pub async fn sign_and_submit(&self, txn: &Transaction) -> Result<Receipt> {
        let signed = self.sign(txn)?;
        let tx_id = self.client.send_raw_transaction(&signed.to_bytes()).await?;
        debug!(tx_id = %tx_id, sender = %self.address, "transaction submitted");

        let receipt = wait_for_confirmation(self.client.as_ref(), &tx_id, &self.confirmation).await?;
        info!(
            tx_id = %receipt.tx_id,
            round = receipt.confirmed_round,
            amount = txn.amount(),
            "transaction confirmed"
        );
        Ok(receipt)
    }

    /// Compose, sign, submit and wait in one call.
    pub async fn pay(
        &self,
        receiver: impl ToAddress,
        amount: u64,
        params: Option<TransactionParams>,
        extras: PaymentExtras,
    ) -> Result<Receipt> {
        self.build_payment(receiver, amount, params, extras)
            .await?
            .submit()
            .await
    }
}

impl<C: LedgerClient> fmt::Debug for Account<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account({})", self.address)
    }
}

/// An unsigned transaction paired with the account that will sign it.
pub struct TransactionWithSigner<'a, C: LedgerClient> {
    txn: Transaction,
    signer: &'a Account<C>,
}

impl<'a, C: LedgerClient> TransactionWithSigner<'a, C> {
    /// Pair a transaction with its signer. The signer must be the sender.
    pub fn new(txn: Transaction, signer: &'a Account<C>) -> Result<Self> {
        if txn.sender() != &signer.address() {
            return Err(LedgerError::WrongSigner {
                expected: *txn.sender(),
                got: signer.address(),
            });
        }
        Ok(Self { txn, signer })
    }

    pub fn transaction(&self) -> &Transaction {
        &self.txn
    }

    pub fn signer(&self) -> &'a Account<C> {
        self.signer
    }

    pub fn into_parts(self) -> (Transaction, &'a Account<C>) {
        (self.txn, self.signer)
    }

    /// Sign with the paired account, submit, and wait for confirmation.
    pub async fn submit(self) -> Result<Receipt> {
        self.signer.sign_and_submit(&self.txn).await
    }
}

impl<C: LedgerClient> fmt::Debug for TransactionWithSigner<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionWithSigner")
            .field("txn", &self.txn)
            .field("signer", &self.signer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLedger;

    fn ledger() -> Arc<MemoryLedger> {
        Arc::new(MemoryLedger::default())
    }

    #[test]
    fn test_address_is_stable_for_seed() {
        let ledger = ledger();
        let a = Account::from_seed(&[5; 32], Arc::clone(&ledger));
        let b = Account::from_seed(&[5; 32], ledger);
        assert_eq!(a.address(), b.address());
        assert_eq!(a.export_seed(), [5; 32]);
    }

    #[test]
    fn test_create_yields_distinct_accounts() {
        let ledger = ledger();
        let a = Account::create(Arc::clone(&ledger)).unwrap();
        let b = Account::create(ledger).unwrap();
        assert_ne!(a.address(), b.address());
    }

    #[tokio::test]
    async fn test_build_payment_rejects_bad_receiver() {
        let account = Account::from_seed(&[1; 32], ledger());
        let err = account
            .build_payment("NOT-AN-ADDRESS", 1, None, PaymentExtras::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_sign_rejects_foreign_transaction() {
        let ledger = ledger();
        let alice = Account::from_seed(&[1; 32], Arc::clone(&ledger));
        let bob = Account::from_seed(&[2; 32], ledger);

        let bundle = alice
            .build_payment(&bob, 1, None, PaymentExtras::default())
            .await
            .unwrap();
        let err = bob.sign(bundle.transaction()).unwrap_err();
        assert!(matches!(err, LedgerError::WrongSigner { .. }));

        let (txn, _) = bundle.into_parts();
        assert!(TransactionWithSigner::new(txn, &bob).is_err());
    }

    #[tokio::test]
    async fn test_build_payment_uses_given_params() {
        let ledger = ledger();
        let alice = Account::from_seed(&[1; 32], Arc::clone(&ledger));
        let mut params = alice.current_params().await.unwrap();
        params.first_valid = 42;
        params.last_valid = 84;

        let bundle = alice
            .build_payment(alice.address(), 0, Some(params), PaymentExtras::with_note(b"n".to_vec()))
            .await
            .unwrap();
        assert_eq!(bundle.transaction().first_valid(), 42);
        assert_eq!(bundle.transaction().note(), b"n");
    }
}
