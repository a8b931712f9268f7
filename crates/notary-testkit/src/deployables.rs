//! Deployable units for pipeline tests.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use notary_core::Address;
use notary_deploy::{Deployable, DeploymentSpec};
use notary_ledger::{Account, LedgerClient};

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub deployer: Address,
    /// Deployer's spendable balance when the unit ran.
    pub spendable: u64,
}

/// Records every call; can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingDeployable {
    calls: Mutex<Vec<Invocation>>,
    failure: Option<String>,
}

impl RecordingDeployable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A unit whose every deploy fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            calls: Mutex::default(),
            failure: Some(message.into()),
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.invocations().len()
    }
}

#[async_trait]
impl<C: LedgerClient> Deployable<C> for RecordingDeployable {
    async fn deploy(
        &self,
        _client: &Arc<C>,
        spec: &DeploymentSpec,
        deployer: &Account<C>,
    ) -> anyhow::Result<()> {
        let spendable = deployer.info().await?.spendable();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Invocation {
                name: spec.name.clone(),
                deployer: deployer.address(),
                spendable,
            });

        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{message}")),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestNetwork;

    #[tokio::test]
    async fn test_records_invocation() {
        let network = TestNetwork::new();
        let deployer = network.funded_account(3_000_000);
        let unit = RecordingDeployable::new();
        let spec = DeploymentSpec::new("Counter", "Counter.arc32.json");

        unit.deploy(&network.ledger, &spec, &deployer).await.unwrap();

        assert_eq!(
            unit.invocations(),
            vec![Invocation {
                name: "Counter".into(),
                deployer: deployer.address(),
                spendable: 2_900_000,
            }]
        );
    }

    #[tokio::test]
    async fn test_failing_unit_still_records() {
        let network = TestNetwork::new();
        let deployer = network.empty_account();
        let unit = RecordingDeployable::failing("already deployed");
        let spec = DeploymentSpec::new("Counter", "Counter.arc32.json");

        let err = unit.deploy(&network.ledger, &spec, &deployer).await.unwrap_err();
        assert_eq!(err.to_string(), "already deployed");
        assert_eq!(unit.call_count(), 1);
    }
}
