//! The Deployer: runs one release through fund, deploy, publish, notarize.

use std::sync::Arc;

use notary_core::{Address, Cid, Receipt, TxId};
use notary_ledger::{Account, FundingGuarantor, FundingThreshold, LedgerClient, PaymentExtras};
use notary_pin::{ArtifactPublisher, PinningTransport};
use tracing::{info, info_span, Instrument};

use crate::config::DeployConfig;
use crate::deployable::{Deployable, DeploymentSpec};
use crate::error::{DeployError, Result, Stage};
use crate::record::NotarizationRecord;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub deployer: Address,
    /// Top-up payment, when one was needed.
    pub funding: Option<Receipt>,
    pub cid: Cid,
    pub gateway_url: String,
    pub notarization: Receipt,
}

impl DeployReport {
    /// Id of the notarization transaction.
    pub fn tx_id(&self) -> &TxId {
        &self.notarization.tx_id
    }
}

/// Deployment pipeline.
///
/// Steps run strictly in sequence; the boundaries between them are the only
/// points at which a run may be abandoned. Two runs must not share a
/// deployer account concurrently.
pub struct Deployer<C: LedgerClient, T: PinningTransport> {
    config: DeployConfig,
    client: Arc<C>,
    guarantor: FundingGuarantor<C>,
    publisher: ArtifactPublisher<T>,
}

impl<C: LedgerClient, T: PinningTransport> Deployer<C, T> {
    pub fn new(
        config: DeployConfig,
        client: Arc<C>,
        guarantor: FundingGuarantor<C>,
        publisher: ArtifactPublisher<T>,
    ) -> Self {
        Self {
            config,
            client,
            guarantor,
            publisher,
        }
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn guarantor(&self) -> &FundingGuarantor<C> {
        &self.guarantor
    }

    pub fn publisher(&self) -> &ArtifactPublisher<T> {
        &self.publisher
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pipeline
    // ─────────────────────────────────────────────────────────────────────────

    /// Run the pipeline for `unit`.
    ///
    /// Any step's failure ends the run. Re-running is safe: funding is skipped
    /// when the deployer is already funded, the unit is deployed again, and a
    /// fresh notarization is written. A top-up includes the notarization fee,
    /// so the run that tops up still ends at the configured initial funds.
    pub async fn deploy<D>(
        &self,
        deployer: &Account<C>,
        unit: &D,
        spec: &DeploymentSpec,
    ) -> Result<DeployReport>
    where
        D: Deployable<C> + ?Sized,
    {
        let span = info_span!("deploy", name = %spec.name, deployer = %deployer.address());
        self.run(deployer, unit, spec).instrument(span).await
    }

    async fn run<D>(
        &self,
        deployer: &Account<C>,
        unit: &D,
        spec: &DeploymentSpec,
    ) -> Result<DeployReport>
    where
        D: Deployable<C> + ?Sized,
    {
        info!(stage = %Stage::Start, spec = %spec.spec_path.display(), "deployment started");

        // Size the notarization up front: an oversized note fails here, before
        // any step has side effects, and its fee is funded with the rest.
        let gateway_base = &self.publisher.config().gateway_base;
        let draft = NotarizationRecord::draft(spec.name.as_str(), gateway_base)
            .to_note()
            .map_err(|source| DeployError::Record {
                stage: Stage::Start,
                source,
            })?;
        let notarization_fee = deployer
            .build_payment(deployer.address(), 0, None, PaymentExtras::with_note(draft))
            .await
            .map_err(DeployError::Prepare)?
            .transaction()
            .fee();

        let threshold = FundingThreshold::uniform(self.config.initial_funds)
            .with_headroom(notarization_fee);
        let funding = self
            .guarantor
            .ensure_funded(&deployer.address(), &threshold)
            .await
            .map_err(DeployError::Funding)?;
        info!(stage = %Stage::Funded, topped_up = funding.is_some(), "deployer funded");

        unit.deploy(&self.client, spec, deployer)
            .await
            .map_err(DeployError::Deploy)?;
        info!(stage = %Stage::Deployed, "unit deployed");

        let cid = self
            .publisher
            .publish(&spec.spec_path, Some(&spec.name))
            .await
            .map_err(DeployError::Publish)?;
        let gateway_url = self.publisher.gateway_url(&cid);
        info!(stage = %Stage::Published, cid = %cid, "spec published");

        let note = NotarizationRecord::new(spec.name.as_str(), cid.clone(), gateway_base)
            .to_note()
            .map_err(|source| DeployError::Record {
                stage: Stage::Notarized,
                source,
            })?;
        let notarization = deployer
            .pay(deployer.address(), 0, None, PaymentExtras::with_note(note))
            .await
            .map_err(DeployError::Notarize)?;
        info!(stage = %Stage::Notarized, tx_id = %notarization.tx_id, "spec notarized");

        info!(
            stage = %Stage::Done,
            tx_id = %notarization.tx_id,
            url = %gateway_url,
            "deployment complete"
        );
        Ok(DeployReport {
            deployer: deployer.address(),
            funding,
            cid,
            gateway_url,
            notarization,
        })
    }
}
