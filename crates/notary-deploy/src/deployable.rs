//! The Deployable trait: one implementation per kind of deployable unit.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use notary_ledger::{Account, LedgerClient};
use serde::{Deserialize, Serialize};

/// What is being released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSpec {
    /// Logical name; tags the upload and prefixes the notarization note.
    pub name: String,
    /// Specification file to publish.
    pub spec_path: PathBuf,
}

impl DeploymentSpec {
    pub fn new(name: impl Into<String>, spec_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            spec_path: spec_path.into(),
        }
    }
}

/// Deploys one unit to the ledger.
///
/// The pipeline calls [`deploy`](Self::deploy) exactly once per run with an
/// already funded deployer. Failures are not interpreted, and nothing is
/// rolled back. Re-running the pipeline calls it again, so implementations
/// should be idempotent or fail loudly on redeploy.
#[async_trait]
pub trait Deployable<C: LedgerClient>: Send + Sync {
    async fn deploy(
        &self,
        client: &Arc<C>,
        spec: &DeploymentSpec,
        deployer: &Account<C>,
    ) -> anyhow::Result<()>;
}
