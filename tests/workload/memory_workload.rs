//! End-to-end runs against the in-memory executor.

use cdc_datagen::testing::init_test_logging;
use datagen_generator::{Identity, LifecycleThresholds, RunPlan, RunRange};
use datagen_workload::{
    DriverConfig, DriverError, DuplicatePolicy, ExecutorError, InMemoryExecutor, Stage,
    WorkloadDriver,
};

const SEED: u64 = 42;

fn config() -> DriverConfig {
    DriverConfig {
        seed: SEED,
        ..DriverConfig::default()
    }
}

async fn run_fresh(range: RunRange) -> InMemoryExecutor {
    let mut driver = WorkloadDriver::new(InMemoryExecutor::new(), config());
    driver.run(range).await.unwrap();
    driver.into_executor()
}

#[tokio::test]
async fn test_ten_identities_are_reproducible() {
    init_test_logging();
    let range = RunRange::from_count(10).unwrap();

    let first = run_fresh(range).await;
    let second = run_fresh(range).await;

    assert_eq!(first.users(), second.users());
    assert_eq!(first.products(), second.products());
    assert_eq!(first.commit_log(), second.commit_log());

    let inserts: Vec<Identity> = first
        .commit_log()
        .iter()
        .filter(|c| c.stage == Stage::Insert)
        .map(|c| c.id)
        .collect();
    assert_eq!(inserts, (1..=10).collect::<Vec<Identity>>());

    let plan = RunPlan::compute(SEED, range, LifecycleThresholds::default());
    let updates = first
        .commit_log()
        .iter()
        .filter(|c| c.stage == Stage::Update)
        .count() as u64;
    assert_eq!(updates, plan.totals.updates);
    assert_eq!(first.users().len() as u64, plan.totals.expected_surviving_rows());
}

#[tokio::test]
async fn test_stages_are_ordered_and_never_interleave() {
    init_test_logging();
    let store = run_fresh(RunRange::from_count(500).unwrap()).await;

    let log = store.commit_log();
    for pair in log.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        assert!(next.sequence > prev.sequence);
        if next.id == prev.id {
            assert!(
                matches!(
                    (prev.stage, next.stage),
                    (Stage::Insert, Stage::Update)
                        | (Stage::Insert, Stage::Delete)
                        | (Stage::Update, Stage::Delete)
                ),
                "unexpected order for identity {}: {} then {}",
                next.id,
                prev.stage,
                next.stage
            );
        } else {
            assert_eq!(next.id, prev.id + 1);
            assert_eq!(next.stage, Stage::Insert);
        }
    }
}

#[tokio::test]
async fn test_records_are_valid() {
    let config = DriverConfig {
        seed: 7,
        thresholds: LifecycleThresholds::new(90, 101).unwrap(),
        ..DriverConfig::default()
    };
    let mut driver = WorkloadDriver::new(InMemoryExecutor::new(), config);
    driver.run(RunRange::from_count(300).unwrap()).await.unwrap();
    let store = driver.into_executor();

    assert_eq!(store.users().len(), 300);
    for user in store.users().values() {
        assert!(!user.username.is_empty());
        assert!(user.email.contains('@'));
    }
    for product in store.products().values() {
        assert!(!product.name.is_empty());
        assert!(!product.description.is_empty());
        assert!(product.price > rust_decimal::Decimal::ZERO);
    }
}

#[tokio::test]
async fn test_duplicate_identity_aborts_and_keeps_one_row() {
    init_test_logging();
    let config = DriverConfig {
        seed: SEED,
        thresholds: LifecycleThresholds::new(101, 101).unwrap(),
        ..DriverConfig::default()
    };
    let range = RunRange::new(5, 1).unwrap();

    let mut driver = WorkloadDriver::new(InMemoryExecutor::new(), config.clone());
    driver.run(range).await.unwrap();
    let original = driver.executor().user(5).cloned().unwrap();

    let mut driver = WorkloadDriver::new(driver.into_executor(), config);
    let err = driver.run(range).await.unwrap_err();
    match &err {
        DriverError::Aborted {
            id, stage, source, ..
        } => {
            assert_eq!(*id, 5);
            assert_eq!(*stage, Stage::Insert);
            assert!(matches!(source, ExecutorError::ConstraintViolation { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }

    let store = driver.into_executor();
    assert_eq!(store.users().len(), 1);
    assert_eq!(store.products().len(), 1);
    assert_eq!(store.user(5), Some(&original));
}

#[tokio::test]
async fn test_duplicate_identity_can_be_skipped() {
    let config = DriverConfig {
        seed: SEED,
        thresholds: LifecycleThresholds::new(1, 101).unwrap(),
        on_duplicate: DuplicatePolicy::Continue,
        ..DriverConfig::default()
    };
    let range = RunRange::new(5, 1).unwrap();

    let mut driver = WorkloadDriver::new(InMemoryExecutor::new(), config.clone());
    driver.run(range).await.unwrap();

    let mut driver = WorkloadDriver::new(driver.into_executor(), config);
    let report = driver.run(range).await.unwrap();

    assert_eq!(report.duplicates, 1);
    assert_eq!(report.totals.inserts, 0);
    // The lifecycle continues on the existing row.
    assert_eq!(report.totals.updates, 1);
    assert_eq!(report.expected_surviving_rows(), 1);
    assert_eq!(driver.executor().users().len(), 1);
}

#[tokio::test]
async fn test_abort_then_resume_matches_uninterrupted_run() {
    init_test_logging();
    let range = RunRange::from_count(40).unwrap();
    let expected = run_fresh(range).await;

    let mut store = InMemoryExecutor::new();
    store.inject_connection_failure(Stage::Insert, 23, 1);
    let mut driver = WorkloadDriver::new(store, config());
    let err = driver.run(range).await.unwrap_err();

    assert_eq!(err.failed_identity(), Some(23));
    assert!(err.to_string().contains("--resume-from 23"));
    let partial = err.partial_report().unwrap();
    assert_eq!(partial.last_committed_id, Some(22));

    let mut resumed = WorkloadDriver::new(driver.into_executor(), config());
    let report = resumed.resume(range, 23).await.unwrap();
    assert_eq!(report.resumed_from, Some(23));
    assert_eq!(report.totals.inserts, 18);

    let store = resumed.into_executor();
    assert_eq!(store.users(), expected.users());
    assert_eq!(store.products(), expected.products());
}

#[tokio::test]
async fn test_resume_after_update_and_delete_failures() {
    init_test_logging();
    let range = RunRange::from_count(200).unwrap();
    let expected = run_fresh(range).await;
    let plan = RunPlan::compute(SEED, range, LifecycleThresholds::default());

    let updated = plan.updated_ids().next().unwrap();
    let deleted = plan.deleted_ids().next().unwrap();

    for (stage, id) in [(Stage::Update, updated), (Stage::Delete, deleted)] {
        let mut store = InMemoryExecutor::new();
        store.inject_connection_failure(stage, id, 1);
        let mut driver = WorkloadDriver::new(store, config());
        let err = driver.run(range).await.unwrap_err();
        assert_eq!(err.failed_identity(), Some(id));

        // Following the message resumes at the identity whose insert committed.
        let mut resumed = WorkloadDriver::new(driver.into_executor(), config());
        let report = resumed.resume(range, id).await.unwrap();
        assert_eq!(report.duplicates, 1, "{stage} failure at {id}");
        assert_eq!(report.last_committed_id, Some(200));

        let store = resumed.into_executor();
        assert_eq!(store.users(), expected.users(), "{stage} failure at {id}");
        assert_eq!(store.products(), expected.products(), "{stage} failure at {id}");
    }
}
