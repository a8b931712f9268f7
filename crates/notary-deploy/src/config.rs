//! Pipeline configuration.

use serde::{Deserialize, Serialize};

/// Configuration for [`Deployer`](crate::Deployer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Spendable balance the deployer must hold before deploying, in micro
    /// units. Also the minimum top-up.
    pub initial_funds: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            initial_funds: 10_000_000,
        }
    }
}
