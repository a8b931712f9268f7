//! Deploy through the facade against the testkit network.

use notary::deploy::NotarizationRecord;
use notary::{DeployError, DeploymentSpec, NotaryConfig, PinError, Stage};
use notary_testkit::{spec_file, RecordingDeployable, TestNetwork};

const SPEC: &[u8] = br#"{"name":"Counter","methods":[{"name":"increment"}]}"#;

fn config() -> NotaryConfig {
    NotaryConfig::from_json(
        r#"{
            "pin": { "gateway_base": "https://ipfs.example/ipfs/" },
            "deploy": { "initial_funds": 3000000 },
            "confirmation": { "max_rounds": 5 }
        }"#,
    )
    .unwrap()
}

#[tokio::test]
async fn deploy_funds_publishes_and_notarizes() {
    notary::init_tracing();
    let network = TestNetwork::new();
    let (notary, pinning) = network.notary(config());
    let deployer = notary.create_account().unwrap();
    let file = spec_file(SPEC);
    let spec = DeploymentSpec::new("Counter", file.path());
    let unit = RecordingDeployable::new();

    let report = notary.deploy(&deployer, &unit, &spec).await.unwrap();

    let calls = unit.invocations();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].deployer, deployer.address());
    assert!(calls[0].spendable >= 3_000_000);

    assert_eq!(pinning.call_count(), 1);
    assert_eq!(pinning.content(&report.cid).as_deref(), Some(SPEC));

    let record = NotarizationRecord::decode(report.notarization.transaction().note()).unwrap();
    assert_eq!(record.name, "Counter");
    assert_eq!(record.cid, report.cid);
    assert_eq!(record.url, format!("https://ipfs.example/ipfs/{}", report.cid));
    assert_eq!(report.notarization.sender(), &deployer.address());
    assert_eq!(report.notarization.receiver(), &deployer.address());
}

#[tokio::test]
async fn accounts_inherit_confirmation_policy() {
    let network = TestNetwork::new();
    let (notary, _) = network.notary(config());
    let account = notary.create_account().unwrap();
    assert_eq!(account.confirmation().max_rounds, 5);
}

#[tokio::test]
async fn errors_name_the_failing_stage() {
    let network = TestNetwork::new();
    let (notary, pinning) = network.notary(config());
    let deployer = notary.create_account().unwrap();
    let file = spec_file(SPEC);
    let spec = DeploymentSpec::new("Counter", file.path());

    pinning.respond_with(500, "gateway melted");
    let err = notary
        .deploy(&deployer, &RecordingDeployable::new(), &spec)
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Published);
    assert!(err.is_retryable());
    assert!(matches!(
        err,
        DeployError::Publish(PinError::InternalServiceError { status: 500, .. })
    ));

    // The same run succeeds once the service recovers.
    let report = notary
        .deploy(&deployer, &RecordingDeployable::new(), &spec)
        .await
        .unwrap();
    assert!(report.funding.is_none());
}

#[tokio::test]
async fn oversized_spec_is_rejected_locally() {
    let network = TestNetwork::new();
    let mut config = config();
    config.pin.max_artifact_bytes = 16;
    let (notary, pinning) = network.notary(config);
    let deployer = notary.create_account().unwrap();
    let file = spec_file(SPEC);

    let err = notary
        .deploy(&deployer, &RecordingDeployable::new(), &DeploymentSpec::new("Counter", file.path()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DeployError::Publish(PinError::ArtifactTooLarge { limit: 16, .. })
    ));
    assert_eq!(pinning.call_count(), 0);
}
