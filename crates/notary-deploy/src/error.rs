//! Error types for the deployment pipeline.

use std::fmt;

use notary_ledger::LedgerError;
use notary_pin::PinError;
use serde::Serialize;
use thiserror::Error;

use crate::record::RecordError;

/// Pipeline position. Stages are reached in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Start,
    Funded,
    Deployed,
    Published,
    Notarized,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Start => "start",
            Stage::Funded => "funded",
            Stage::Deployed => "deployed",
            Stage::Published => "published",
            Stage::Notarized => "notarized",
            Stage::Done => "done",
        };
        f.write_str(s)
    }
}

/// A pipeline failure, tagged with the step that failed.
///
/// The lower-level error is kept intact as the source.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The notarization could not be prepared; nothing has run yet.
    #[error("preparing the notarization failed")]
    Prepare(#[source] LedgerError),

    #[error("encoding the notarization record failed")]
    Record {
        stage: Stage,
        #[source]
        source: RecordError,
    },

    #[error("funding the deployer failed")]
    Funding(#[source] LedgerError),

    /// Raised by the deployable unit; passed through uninterpreted.
    #[error("deployment callback failed")]
    Deploy(#[source] anyhow::Error),

    #[error("publishing the deployment spec failed")]
    Publish(#[source] PinError),

    #[error("notarizing the spec CID failed")]
    Notarize(#[source] LedgerError),
}

impl DeployError {
    /// The stage the pipeline was trying to reach when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            DeployError::Prepare(_) => Stage::Start,
            DeployError::Record { stage, .. } => *stage,
            DeployError::Funding(_) => Stage::Funded,
            DeployError::Deploy(_) => Stage::Deployed,
            DeployError::Publish(_) => Stage::Published,
            DeployError::Notarize(_) => Stage::Notarized,
        }
    }

    /// Whether re-running the whole pipeline could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            DeployError::Prepare(e) | DeployError::Funding(e) | DeployError::Notarize(e) => {
                e.is_retryable()
            }
            DeployError::Publish(e) => e.is_retryable(),
            DeployError::Deploy(_) | DeployError::Record { .. } => false,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, DeployError>;
