//! The Notary: a configured pipeline bound to one ledger client.

use std::sync::Arc;

use notary_core::Keypair;
use notary_deploy::{DeployReport, Deployable, Deployer, DeploymentSpec};
use notary_ledger::{Account, FundingGuarantor, LedgerClient};
use notary_pin::{ArtifactPublisher, Credential, HttpPinningTransport, PinError, PinningTransport};

use tracing::debug;

use crate::config::NotaryConfig;

/// Configured pipeline.
///
/// Accounts handed out by the Notary share its client and confirmation
/// policy.
pub struct Notary<C: LedgerClient, T: PinningTransport = HttpPinningTransport> {
    config: NotaryConfig,
    client: Arc<C>,
    pipeline: Deployer<C, T>,
}

impl<C: LedgerClient> Notary<C, HttpPinningTransport> {
    /// Build a Notary that uploads over HTTPS.
    ///
    /// The pinning credential is read from `config.pin.credential_var` on
    /// each publish.
    pub fn connect(config: NotaryConfig, client: Arc<C>, funder: Keypair) -> Result<Self, PinError> {
        let transport = HttpPinningTransport::new(&config.pin)?;
        Ok(Self::with_transport(config, client, funder, transport, None))
    }
}

impl<C: LedgerClient, T: PinningTransport> Notary<C, T> {
    /// Build a Notary over any pinning transport.
    ///
    /// `credential` overrides the environment lookup when set.
    pub fn with_transport(
        config: NotaryConfig,
        client: Arc<C>,
        funder: Keypair,
        transport: T,
        credential: Option<Credential>,
    ) -> Self {
        let mut publisher = ArtifactPublisher::new(config.pin.clone(), transport);
        if let Some(credential) = credential {
            publisher = publisher.with_credential(credential);
        }

        let funder = Account::from_keypair(funder, Arc::clone(&client))
            .with_confirmation(config.confirmation.clone());
        debug!(
            funder = %funder.address(),
            initial_funds = config.deploy.initial_funds,
            "notary configured"
        );
        let pipeline = Deployer::new(
            config.deploy.clone(),
            Arc::clone(&client),
            FundingGuarantor::new(funder),
            publisher,
        );

        Self {
            config,
            client,
            pipeline,
        }
    }

    pub fn config(&self) -> &NotaryConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn pipeline(&self) -> &Deployer<C, T> {
        &self.pipeline
    }

    /// Generate a fresh account on this Notary's client.
    pub fn create_account(&self) -> notary_ledger::Result<Account<C>> {
        Account::create(Arc::clone(&self.client))
            .map(|account| account.with_confirmation(self.config.confirmation.clone()))
    }

    /// Bind an existing key to this Notary's client.
    pub fn account(&self, keypair: Keypair) -> Account<C> {
        Account::from_keypair(keypair, Arc::clone(&self.client))
            .with_confirmation(self.config.confirmation.clone())
    }

    /// Run the deployment pipeline for `unit`.
    pub async fn deploy<D>(
        &self,
        deployer: &Account<C>,
        unit: &D,
        spec: &DeploymentSpec,
    ) -> notary_deploy::Result<DeployReport>
    where
        D: Deployable<C> + ?Sized,
    {
        self.pipeline.deploy(deployer, unit, spec).await
    }
}
