//! End-to-end payment behaviour against the in-memory ledger.

use std::sync::Arc;

use notary_ledger::{
    Account, ConfirmationPolicy, FundingGuarantor, FundingThreshold, LedgerClient, LedgerError,
    MemoryLedger, PaymentExtras,
};

const FUNDER_BALANCE: u64 = 1_000_000_000;

fn setup() -> (Arc<MemoryLedger>, Account<MemoryLedger>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("notary_ledger=debug")
        .with_test_writer()
        .try_init();

    let ledger = Arc::new(MemoryLedger::default());
    let funder = Account::from_seed(&[0xF0; 32], Arc::clone(&ledger));
    ledger.fund(&funder.address(), FUNDER_BALANCE);
    (ledger, funder)
}

#[tokio::test]
async fn receipt_matches_submitted_payment() {
    let (ledger, alice) = setup();
    let bob = Account::create(Arc::clone(&ledger)).unwrap();

    let receipt = alice
        .pay(&bob, 2_500_000, None, PaymentExtras::with_note(b"hello".to_vec()))
        .await
        .unwrap();

    assert_eq!(receipt.sender(), &alice.address());
    assert_eq!(receipt.receiver(), &bob.address());
    assert_eq!(receipt.amount(), 2_500_000);
    assert_eq!(receipt.transaction().note(), b"hello");
    assert!(receipt.confirmed_round >= 1);
    assert_eq!(ledger.balance(&bob.address()), 2_500_000);
}

#[tokio::test]
async fn receiver_can_be_given_as_text() {
    let (ledger, alice) = setup();
    let bob = Account::create(Arc::clone(&ledger)).unwrap();

    let text = bob.address().to_string();
    let receipt = alice
        .pay(text.as_str(), 200_000, None, PaymentExtras::default())
        .await
        .unwrap();
    assert_eq!(receipt.receiver(), &bob.address());
}

#[tokio::test]
async fn stalled_ledger_times_out() {
    let (ledger, alice) = setup();
    let alice = alice.with_confirmation(ConfirmationPolicy {
        max_rounds: 3,
        poll_interval_ms: 0,
    });
    let bob = Account::create(Arc::clone(&ledger)).unwrap();

    ledger.stall();
    let err = alice
        .pay(&bob, 1_000_000, None, PaymentExtras::default())
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    match err {
        LedgerError::ConfirmationTimeout { rounds, .. } => assert_eq!(rounds, 3),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn pool_eviction_is_reported_as_rejection() {
    let (ledger, alice) = setup();
    let bob = Account::create(Arc::clone(&ledger)).unwrap();

    let bundle = alice
        .build_payment(&bob, 1_000_000, None, PaymentExtras::default())
        .await
        .unwrap();
    let signed = alice.sign(bundle.transaction()).unwrap();
    let tx_id = ledger.send_raw_transaction(&signed.to_bytes()).await.unwrap();
    ledger.evict_pool("fee too low under congestion");

    let err = notary_ledger::wait_for_confirmation(
        ledger.as_ref(),
        &tx_id,
        &ConfirmationPolicy::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LedgerError::SubmissionRejected(ref r) if r.contains("congestion")));
    assert_eq!(ledger.balance(&bob.address()), 0);
    assert_eq!(ledger.balance(&alice.address()), FUNDER_BALANCE);
}

#[tokio::test]
async fn confirmation_in_last_budgeted_round_succeeds() {
    let (ledger, alice) = setup();
    let alice = alice.with_confirmation(ConfirmationPolicy {
        max_rounds: 1,
        poll_interval_ms: 0,
    });
    let start = ledger.round();

    let receipt = alice
        .pay(alice.address(), 0, None, PaymentExtras::default())
        .await
        .unwrap();
    assert_eq!(receipt.confirmed_round, start + 1);
    assert_eq!(ledger.confirmed_transactions().len(), 1);
}

#[tokio::test]
async fn overspend_is_rejected_without_effects() {
    let (ledger, _) = setup();
    let poor = Account::create(Arc::clone(&ledger)).unwrap();
    let rich = Account::create(Arc::clone(&ledger)).unwrap();
    ledger.fund(&poor.address(), 150_000);

    let err = poor
        .pay(&rich, 1_000_000, None, PaymentExtras::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::SubmissionRejected(_)));
    assert_eq!(ledger.balance(&poor.address()), 150_000);
    assert_eq!(ledger.accepted_count(), 0);
}

#[tokio::test]
async fn lease_blocks_duplicate_intent() {
    let (ledger, alice) = setup();
    let bob = Account::create(Arc::clone(&ledger)).unwrap();
    let extras = PaymentExtras {
        lease: Some([7; 32]),
        ..Default::default()
    };

    alice
        .pay(&bob, 500_000, None, extras.clone())
        .await
        .unwrap();
    let err = alice
        .pay(&bob, 600_000, None, extras)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::SubmissionRejected(ref r) if r.contains("lease")));
}

#[tokio::test]
async fn funding_is_idempotent() {
    let (ledger, funder) = setup();
    let guarantor = FundingGuarantor::new(funder);
    let app = Account::create(Arc::clone(&ledger)).unwrap();
    let threshold = FundingThreshold::uniform(2_000_000);

    let first = guarantor
        .ensure_funded(&app.address(), &threshold)
        .await
        .unwrap();
    assert!(first.is_some());
    let info = app.info().await.unwrap();
    assert!(info.spendable() >= threshold.min_spending_balance);

    let second = guarantor
        .ensure_funded(&app.address(), &threshold)
        .await
        .unwrap();
    assert!(second.is_none());
    assert_eq!(ledger.accepted_count(), 1);
}

#[tokio::test]
async fn funding_tops_up_by_at_least_the_increment() {
    let (ledger, funder) = setup();
    let guarantor = FundingGuarantor::new(funder);
    let app = Account::create(Arc::clone(&ledger)).unwrap();
    ledger.fund(&app.address(), 100_000 + 1_900_000);

    let threshold = FundingThreshold {
        min_spending_balance: 2_000_000,
        min_top_up: 1_000_000,
        headroom: 0,
    };
    let receipt = guarantor
        .ensure_funded(&app.address(), &threshold)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(receipt.amount(), 1_000_000);
    assert_eq!(ledger.balance(&app.address()), 3_000_000);
}

#[tokio::test]
async fn funding_fails_when_funder_is_short() {
    let ledger = Arc::new(MemoryLedger::default());
    let funder = Account::from_seed(&[0xF1; 32], Arc::clone(&ledger));
    ledger.fund(&funder.address(), 500_000);
    let guarantor = FundingGuarantor::new(funder);
    let app = Account::create(Arc::clone(&ledger)).unwrap();

    let err = guarantor
        .ensure_funded(&app.address(), &FundingThreshold::uniform(5_000_000))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunderBalance { .. }));
    assert_eq!(ledger.accepted_count(), 0);
}
