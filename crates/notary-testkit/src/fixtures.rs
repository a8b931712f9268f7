//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: an in-memory network with a
//! well-funded dispenser, and a Notary wired to in-memory services.

use std::io::Write;
use std::sync::Arc;

use notary::{Notary, NotaryConfig};
use notary_core::Keypair;
use notary_ledger::{Account, MemoryLedger};
use notary_pin::{Credential, MemoryPinning};

/// Seed of the dispenser account every fixture network starts with.
pub const DISPENSER_SEED: [u8; 32] = [0xD1; 32];

/// Initial dispenser balance, in micro units.
pub const DISPENSER_BALANCE: u64 = 1_000_000_000_000;

/// An in-memory ledger with a funded dispenser account.
pub struct TestNetwork {
    pub ledger: Arc<MemoryLedger>,
}

impl TestNetwork {
    pub fn new() -> Self {
        let ledger = Arc::new(MemoryLedger::default());
        let dispenser = Keypair::from_seed(&DISPENSER_SEED);
        ledger.fund(
            &notary_core::Address::from_public_key(dispenser.public_key()),
            DISPENSER_BALANCE,
        );
        Self { ledger }
    }

    /// The funded dispenser.
    pub fn dispenser(&self) -> Account<MemoryLedger> {
        Account::from_seed(&DISPENSER_SEED, Arc::clone(&self.ledger))
    }

    /// A fresh account with a random key and no balance.
    pub fn empty_account(&self) -> Account<MemoryLedger> {
        Account::create(Arc::clone(&self.ledger))
            .unwrap_or_else(|e| panic!("cannot generate account: {e}"))
    }

    /// A fresh account credited with `amount`.
    pub fn funded_account(&self, amount: u64) -> Account<MemoryLedger> {
        let account = self.empty_account();
        self.ledger.fund(&account.address(), amount);
        account
    }

    /// A Notary whose funder is the dispenser and whose uploads go to the
    /// returned in-memory pinning service.
    pub fn notary(
        &self,
        config: NotaryConfig,
    ) -> (Notary<MemoryLedger, Arc<MemoryPinning>>, Arc<MemoryPinning>) {
        let pinning = Arc::new(MemoryPinning::new());
        let notary = Notary::with_transport(
            config,
            Arc::clone(&self.ledger),
            Keypair::from_seed(&DISPENSER_SEED),
            Arc::clone(&pinning),
            Credential::new("testkit-jwt"),
        );
        (notary, pinning)
    }
}

impl Default for TestNetwork {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `contents` to a temporary file that lives as long as the handle.
pub fn spec_file(contents: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".arc32.json")
        .tempfile()
        .unwrap_or_else(|e| panic!("cannot create spec file: {e}"));
    file.write_all(contents)
        .unwrap_or_else(|e| panic!("cannot write spec file: {e}"));
    file
}
