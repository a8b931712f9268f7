//! Funding guarantor: keeps an account's spendable balance above a threshold.

use notary_core::{Address, Receipt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::account::{Account, PaymentExtras};
use crate::client::LedgerClient;
use crate::error::{LedgerError, Result};

/// Minimum spendable balance and minimum top-up, in micro units.
///
/// `headroom` is added on top of any shortfall, so an account topped up to
/// the threshold can still pay that much in fees without dropping below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingThreshold {
    pub min_spending_balance: u64,
    pub min_top_up: u64,
    #[serde(default)]
    pub headroom: u64,
}

impl FundingThreshold {
    /// Threshold whose minimum also serves as the top-up increment.
    pub const fn uniform(amount: u64) -> Self {
        Self {
            min_spending_balance: amount,
            min_top_up: amount,
            headroom: 0,
        }
    }

    pub const fn with_headroom(mut self, headroom: u64) -> Self {
        self.headroom = headroom;
        self
    }

    /// Amount to send to an account that is `shortfall` short, or 0.
    pub fn top_up_for(&self, shortfall: u64) -> u64 {
        if shortfall == 0 {
            0
        } else {
            shortfall.saturating_add(self.headroom).max(self.min_top_up)
        }
    }
}

/// Tops accounts up from a designated funding account.
pub struct FundingGuarantor<C: LedgerClient> {
    funder: Account<C>,
}

impl<C: LedgerClient> FundingGuarantor<C> {
    pub fn new(funder: Account<C>) -> Self {
        Self { funder }
    }

    pub fn funder(&self) -> &Account<C> {
        &self.funder
    }

    /// Ensure `address` has at least `threshold.min_spending_balance` spendable.
    ///
    /// Returns `None` without touching the ledger beyond a balance read when
    /// the account is already funded, so repeated calls are safe.
    pub async fn ensure_funded(
        &self,
        address: &Address,
        threshold: &FundingThreshold,
    ) -> Result<Option<Receipt>> {
        let client = self.funder.client();
        let info = client.account_info(address).await?;
        let shortfall = info.shortfall(threshold.min_spending_balance);

        if shortfall == 0 {
            debug!(
                address = %address,
                spendable = info.spendable(),
                "account already funded"
            );
            return Ok(None);
        }

        let top_up = threshold.top_up_for(shortfall);
        let bundle = self
            .funder
            .build_payment(address, top_up, None, PaymentExtras::default())
            .await?;

        let funder_info = self.funder.info().await?;
        let needed = top_up.saturating_add(bundle.transaction().fee());
        if funder_info.spendable() < needed {
            warn!(
                funder = %self.funder.address(),
                available = funder_info.spendable(),
                needed,
                "funder cannot cover top-up"
            );
            return Err(LedgerError::InsufficientFunderBalance {
                funder: self.funder.address(),
                needed,
                available: funder_info.spendable(),
            });
        }

        let receipt = bundle.submit().await?;
        info!(
            address = %address,
            amount = top_up,
            tx_id = %receipt.tx_id,
            "account topped up"
        );
        Ok(Some(receipt))
    }
}
