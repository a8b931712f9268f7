//! Payment transactions.
//!
//! A [`Transaction`] is built once by [`PaymentBuilder`] and never mutated.
//! Signing produces a [`SignedTransaction`], which is what gets submitted.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::address::Address;
use crate::canonical::{canonical_bytes, decode_signed_transaction, signed_transaction_bytes};
use crate::crypto::{base32_decode, base32_encode, Keypair, Signature};
use crate::error::{CoreError, Result};

/// Maximum note (memo) length in bytes.
pub const MAX_NOTE_LEN: usize = 1024;

/// Domain prefix for transaction signatures and ids.
pub(crate) const TX_DOMAIN: &[u8] = b"TX";

/// Domain prefix for group ids.
const GROUP_DOMAIN: &[u8] = b"TG";

/// Bytes a signature adds to the encoded transaction, used for fee estimation.
const SIGNATURE_OVERHEAD: usize = 70;

/// Suggested parameters for building a transaction, as reported by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionParams {
    /// Fee per encoded byte, or the absolute fee when `flat_fee` is set.
    pub fee: u64,
    /// Minimum fee accepted by the network.
    pub min_fee: u64,
    /// Whether `fee` is absolute rather than per byte.
    pub flat_fee: bool,
    /// First round the transaction is valid in.
    pub first_valid: u64,
    /// Last round the transaction is valid in.
    pub last_valid: u64,
    /// Human-readable network id.
    pub genesis_id: String,
    /// Hash of the genesis block.
    pub genesis_hash: [u8; 32],
}

/// A 32-byte transaction identifier: `Blake3("TX" || canonical_bytes(txn))`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId(pub [u8; 32]);

impl TxId {
    /// Compute the id of a transaction.
    pub fn of(txn: &Transaction) -> Self {
        Self(*blake3::hash(&txn.sign_message()).as_bytes())
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base32_encode(&self.0, true))
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({}...)", &self.to_string()[..12])
    }
}

impl FromStr for TxId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = base32_decode(s)
            .filter(|b| b.len() == 32)
            .ok_or_else(|| CoreError::DecodingError(format!("invalid transaction id: {s}")))?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for TxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifier shared by every member of an atomic transaction group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub [u8; 32]);

impl GroupId {
    /// Compute the group id over member transaction ids, in order.
    pub fn compute(tx_ids: &[TxId]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(GROUP_DOMAIN);
        for id in tx_ids {
            hasher.update(id.as_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }
}

/// An immutable payment transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub(crate) sender: Address,
    pub(crate) receiver: Address,
    pub(crate) amount: u64,
    pub(crate) fee: u64,
    pub(crate) first_valid: u64,
    pub(crate) last_valid: u64,
    pub(crate) genesis_id: String,
    pub(crate) genesis_hash: [u8; 32],
    pub(crate) note: Vec<u8>,
    pub(crate) lease: Option<[u8; 32]>,
    pub(crate) group: Option<GroupId>,
}

impl Transaction {
    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn receiver(&self) -> &Address {
        &self.receiver
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn fee(&self) -> u64 {
        self.fee
    }

    pub fn first_valid(&self) -> u64 {
        self.first_valid
    }

    pub fn last_valid(&self) -> u64 {
        self.last_valid
    }

    pub fn genesis_id(&self) -> &str {
        &self.genesis_id
    }

    pub fn genesis_hash(&self) -> &[u8; 32] {
        &self.genesis_hash
    }

    pub fn note(&self) -> &[u8] {
        &self.note
    }

    pub fn lease(&self) -> Option<&[u8; 32]> {
        self.lease.as_ref()
    }

    pub fn group(&self) -> Option<&GroupId> {
        self.group.as_ref()
    }

    /// Compute the transaction id.
    pub fn id(&self) -> TxId {
        TxId::of(self)
    }

    /// A copy of this transaction assigned to an atomic group.
    ///
    /// The original is left untouched; the copy has a different id.
    pub fn in_group(&self, group: GroupId) -> Self {
        Self {
            group: Some(group),
            ..self.clone()
        }
    }

    /// A copy of this transaction with any group assignment removed.
    pub fn without_group(&self) -> Self {
        Self {
            group: None,
            ..self.clone()
        }
    }

    /// The bytes a signature covers: `"TX" || canonical_bytes(self)`.
    pub fn sign_message(&self) -> Vec<u8> {
        let mut message = TX_DOMAIN.to_vec();
        message.extend_from_slice(&canonical_bytes(self));
        message
    }

    /// Sign with the given keypair.
    ///
    /// Does not check that the keypair matches the sender; the ledger rejects
    /// mismatched signatures.
    pub fn sign(&self, keypair: &Keypair) -> SignedTransaction {
        let signature = keypair.sign(&self.sign_message());
        SignedTransaction {
            txn: self.clone(),
            signature,
        }
    }
}

/// Builder for payment transactions.
#[derive(Debug, Clone)]
pub struct PaymentBuilder {
    sender: Address,
    receiver: Address,
    amount: u64,
    params: TransactionParams,
    note: Vec<u8>,
    lease: Option<[u8; 32]>,
    flat_fee: Option<u64>,
}

impl PaymentBuilder {
    /// Start a payment of `amount` micro units.
    pub fn new(sender: Address, receiver: Address, amount: u64, params: TransactionParams) -> Self {
        Self {
            sender,
            receiver,
            amount,
            params,
            note: Vec::new(),
            lease: None,
            flat_fee: None,
        }
    }

    /// Attach memo bytes.
    pub fn note(mut self, note: impl Into<Vec<u8>>) -> Self {
        self.note = note.into();
        self
    }

    /// Attach a lease, preventing a second transaction with the same lease
    /// from the same sender within the validity window.
    pub fn lease(mut self, lease: [u8; 32]) -> Self {
        self.lease = Some(lease);
        self
    }

    /// Use an absolute fee instead of the per-byte estimate.
    pub fn flat_fee(mut self, fee: u64) -> Self {
        self.flat_fee = Some(fee);
        self
    }

    /// Build the transaction, computing its fee.
    pub fn build(self) -> Result<Transaction> {
        if self.note.len() > MAX_NOTE_LEN {
            return Err(CoreError::NoteTooLarge {
                len: self.note.len(),
                max: MAX_NOTE_LEN,
            });
        }
        if self.params.first_valid > self.params.last_valid {
            return Err(CoreError::MalformedTransaction(format!(
                "validity window {}..{} is empty",
                self.params.first_valid, self.params.last_valid
            )));
        }

        let min_fee = self.params.min_fee;
        let mut txn = Transaction {
            sender: self.sender,
            receiver: self.receiver,
            amount: self.amount,
            fee: min_fee,
            first_valid: self.params.first_valid,
            last_valid: self.params.last_valid,
            genesis_id: self.params.genesis_id,
            genesis_hash: self.params.genesis_hash,
            note: self.note,
            lease: self.lease,
            group: None,
        };

        txn.fee = match self.flat_fee {
            Some(fee) => fee.max(min_fee),
            None if self.params.flat_fee => self.params.fee.max(min_fee),
            None => {
                let size = (canonical_bytes(&txn).len() + SIGNATURE_OVERHEAD) as u64;
                self.params.fee.saturating_mul(size).max(min_fee)
            }
        };

        Ok(txn)
    }
}

/// A transaction together with its sender's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub txn: Transaction,
    pub signature: Signature,
}

impl SignedTransaction {
    /// The id of the wrapped transaction.
    pub fn id(&self) -> TxId {
        self.txn.id()
    }

    /// Verify the signature against the sender's key.
    pub fn verify(&self) -> Result<()> {
        self.txn
            .sender
            .public_key()
            .verify(&self.txn.sign_message(), &self.signature)
    }

    /// Wire bytes for submission.
    pub fn to_bytes(&self) -> Vec<u8> {
        signed_transaction_bytes(self)
    }

    /// Decode wire bytes. Rejects non-canonical encodings.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_signed_transaction(bytes)
    }
}
