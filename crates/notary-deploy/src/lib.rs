//! # Notary Deploy
//!
//! Release pipeline for ledger-deployed units:
//!
//! ```text
//! START → FUNDED → DEPLOYED → PUBLISHED → NOTARIZED → DONE
//! ```
//!
//! 1. Top the deployer up to the configured initial funds.
//! 2. Invoke the unit's [`Deployable`] implementation.
//! 3. Publish the unit's specification file and obtain its CID.
//! 4. Write a [`NotarizationRecord`] on the ledger as the memo of a
//!    zero-amount self-payment from the deployer.
//!
//! Errors carry the failing stage and keep the underlying error as their
//! source, so callers can tell a funding failure from a publish failure.

pub mod config;
pub mod deployable;
pub mod deployer;
pub mod error;
pub mod record;

pub use config::DeployConfig;
pub use deployable::{Deployable, DeploymentSpec};
pub use deployer::{DeployReport, Deployer};
pub use error::{DeployError, Result, Stage};
pub use record::{NotarizationRecord, RecordError};
