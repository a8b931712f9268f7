//! # Notary Testkit
//!
//! Testing utilities for Notary.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: An in-memory network with a funded dispenser, and a Notary
//!   wired to in-memory ledger and pinning services
//! - **Deployables**: A recording unit for pipeline tests
//! - **Generators**: Proptest strategies for property-based testing
//! - **Golden vectors**: Transaction ids and CIDs that must stay stable
//!
//! ## Test Fixtures
//!
//! ```rust
//! use notary_testkit::fixtures::TestNetwork;
//!
//! let network = TestNetwork::new();
//! let alice = network.funded_account(5_000_000);
//! assert_eq!(network.ledger.balance(&alice.address()), 5_000_000);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use notary_testkit::generators::{address, amount};
//!
//! proptest! {
//!     #[test]
//!     fn address_round_trips(addr in address()) {
//!         prop_assert_eq!(addr.to_string().parse::<notary_core::Address>().unwrap(), addr);
//!     }
//! }
//! ```

pub mod deployables;
pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use deployables::{Invocation, RecordingDeployable};
pub use fixtures::{spec_file, TestNetwork, DISPENSER_SEED};
pub use vectors::{cid_vectors, transaction_vectors, verify_cid_vectors, verify_transaction_vectors};
