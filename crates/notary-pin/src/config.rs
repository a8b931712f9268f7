//! Publisher configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default upload endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";

/// Default gateway prefix; a CID appended to it gives a fetchable URL.
pub const DEFAULT_GATEWAY_BASE: &str = "https://gateway.pinata.cloud/ipfs/";

/// Environment variable holding the bearer token by default.
pub const DEFAULT_CREDENTIAL_VAR: &str = "PINATA_JWT";

/// Largest artifact accepted by default (100 MiB).
pub const DEFAULT_MAX_ARTIFACT_BYTES: u64 = 100 * 1024 * 1024;

/// Configuration for [`ArtifactPublisher`](crate::ArtifactPublisher) and
/// [`HttpPinningTransport`](crate::HttpPinningTransport).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    pub endpoint: String,
    pub gateway_base: String,
    /// Name of the environment variable the credential is read from.
    pub credential_var: String,
    pub max_artifact_bytes: u64,
    pub timeout_secs: u64,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            gateway_base: DEFAULT_GATEWAY_BASE.into(),
            credential_var: DEFAULT_CREDENTIAL_VAR.into(),
            max_artifact_bytes: DEFAULT_MAX_ARTIFACT_BYTES,
            timeout_secs: 90,
        }
    }
}

impl PinConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
