//! # Notary
//!
//! Fund a deployer, deploy a ledger application, publish its specification
//! to a pinning service, and notarize the resulting CID on the ledger.
//!
//! ## Overview
//!
//! - **Accounts**: signing identities that build, sign, submit and confirm
//!   payments ([`ledger`])
//! - **Funding**: idempotent top-ups from a funder account
//! - **Publishing**: one multipart upload per artifact, typed failures ([`pin`])
//! - **Notarization**: a zero-amount self-payment whose memo records the
//!   spec's CID and gateway URL ([`deploy`])
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use notary::{DeploymentSpec, Notary, NotaryConfig};
//! use notary::core::Keypair;
//! use notary::ledger::MemoryLedger;
//!
//! # struct HelloWorld;
//! # #[async_trait::async_trait]
//! # impl notary::Deployable<MemoryLedger> for HelloWorld {
//! #     async fn deploy(
//! #         &self,
//! #         _: &Arc<MemoryLedger>,
//! #         _: &DeploymentSpec,
//! #         _: &notary::ledger::Account<MemoryLedger>,
//! #     ) -> anyhow::Result<()> { Ok(()) }
//! # }
//! async fn example() {
//!     notary::init_tracing();
//!
//!     let config = NotaryConfig::from_file("notary.json").unwrap();
//!     let client = Arc::new(MemoryLedger::default());
//!     let notary = Notary::connect(config, client, Keypair::generate().unwrap()).unwrap();
//!
//!     let deployer = notary.create_account().unwrap();
//!     let spec = DeploymentSpec::new("HelloWorld", "artifacts/HelloWorld.arc32.json");
//!     let report = notary.deploy(&deployer, &HelloWorld, &spec).await.unwrap();
//!     println!("notarized in {} at {}", report.tx_id(), report.gateway_url);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `notary::core` - Keys, addresses, transactions, receipts, CIDs
//! - `notary::ledger` - Ledger client trait, accounts, funding, groups
//! - `notary::pin` - Artifact publisher and pinning transports
//! - `notary::deploy` - Deployment pipeline and notarization records

pub mod config;
pub mod notary;
pub mod telemetry;

pub use notary_core as core;
pub use notary_deploy as deploy;
pub use notary_ledger as ledger;
pub use notary_pin as pin;

pub use config::{ConfigError, NotaryConfig};
pub use notary::Notary;
pub use telemetry::init_tracing;

pub use notary_core::{Address, Cid, Receipt, TxId};
pub use notary_deploy::{DeployError, DeployReport, Deployable, DeploymentSpec, Stage};
pub use notary_ledger::{Account, LedgerClient, LedgerError};
pub use notary_pin::PinError;
