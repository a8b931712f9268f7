//! # Notary Core
//!
//! Pure primitives for Notary: signing keys, ledger addresses, payment
//! transactions and their canonical encoding, confirmation receipts and
//! content identifiers.
//!
//! This crate contains no I/O and no networking. It is pure computation
//! over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`Keypair`] - Ed25519 signing key held by an account
//! - [`Address`] - Checksummed base32 rendering of a public key
//! - [`Transaction`] - Immutable payment description, built by [`PaymentBuilder`]
//! - [`SignedTransaction`] - Transaction plus signature, submit-once
//! - [`TxId`] - Content-addressed transaction identifier (Blake3)
//! - [`Receipt`] - Result of a confirmed submission
//! - [`Cid`] - Content identifier returned by a pinning service
//!
//! ## Canonicalization
//!
//! Transactions are encoded using deterministic CBOR. See [`canonical`] module.

pub mod address;
pub mod canonical;
pub mod cid;
pub mod crypto;
pub mod error;
pub mod receipt;
pub mod transaction;

pub use address::Address;
pub use canonical::{canonical_bytes, decode_signed_transaction, signed_transaction_bytes};
pub use cid::Cid;
pub use crypto::{Keypair, PublicKey, Signature};
pub use error::{CoreError, Result};
pub use receipt::{PendingTransaction, Receipt};
pub use transaction::{
    GroupId, PaymentBuilder, SignedTransaction, Transaction, TransactionParams, TxId, MAX_NOTE_LEN,
};
