//! # Notary Ledger
//!
//! Accounts and payments against a ledger node: signing identities,
//! submission with a bounded confirmation wait, atomic groups, and a funding
//! guarantor that keeps accounts above a spendable threshold.
//!
//! ## Key Types
//!
//! - [`LedgerClient`] - The async trait every ledger node implements
//! - [`Account`] - Signing identity bound to a client
//! - [`TransactionWithSigner`] - Unsigned transaction paired with its signer
//! - [`AtomicGroup`] - All-or-nothing submission of several transactions
//! - [`FundingGuarantor`] - Tops accounts up from a funder
//! - [`MemoryLedger`] - In-process ledger for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use notary_ledger::{Account, MemoryLedger, PaymentExtras};
//!
//! async fn example() {
//!     let ledger = Arc::new(MemoryLedger::default());
//!     let alice = Account::create(Arc::clone(&ledger)).unwrap();
//!     let bob = Account::create(Arc::clone(&ledger)).unwrap();
//!     ledger.fund(&alice.address(), 10_000_000);
//!
//!     let receipt = alice
//!         .pay(&bob, 1_000_000, None, PaymentExtras::default())
//!         .await
//!         .unwrap();
//!     assert_eq!(receipt.amount(), 1_000_000);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - Building is separate from signing; signing is separate from submitting.
//! - Submission is never retried here. A rejected transaction must be rebuilt
//!   with fresh parameters by the caller.

pub mod account;
pub mod client;
pub mod confirm;
pub mod error;
pub mod funding;
pub mod group;
pub mod memory;

pub use account::{Account, PaymentExtras, ToAddress, TransactionWithSigner};
pub use client::{AccountInfo, LedgerClient, NodeStatus};
pub use confirm::{wait_for_confirmation, ConfirmationPolicy};
pub use error::{LedgerError, Result};
pub use funding::{FundingGuarantor, FundingThreshold};
pub use group::{AtomicGroup, GroupReceipt, MAX_GROUP_SIZE};
pub use memory::{MemoryLedger, MemoryLedgerConfig};
