//! Runs against a live PostgreSQL.
//!
//! Each test provisions its own schema and drops it afterwards.

use cdc_datagen::testing::postgresql::{
    cleanup_schema, connect_test_client, create_postgres_config, provision_schema,
};
use cdc_datagen::testing::{init_test_logging, unique_schema_name};
use cdc_datagen::verify_table;
use datagen_generator::{LifecycleThresholds, RecordFactory, RunPlan, RunRange};
use datagen_postgresql::{
    ids_in_range, missing_tables, row_counts_in_range, PostgreSQLExecutor,
    PostgreSQLExecutorError, TableCounts, PRODUCTS_TABLE, USERS_TABLE,
};
use datagen_workload::{
    DriverConfig, DriverError, ExecutorError, MutationExecutor, Stage, WorkloadDriver,
};

const SEED: u64 = 42;

#[tokio::test]
#[ignore = "Requires a PostgreSQL server at POSTGRESQL_TEST_URL"]
async fn test_postgresql_run_leaves_planned_rows() -> anyhow::Result<()> {
    init_test_logging();
    let pg_config = create_postgres_config();
    let client = connect_test_client(&pg_config).await?;
    let schema = unique_schema_name("cdc_run");
    provision_schema(&client, &schema).await?;

    let executor = PostgreSQLExecutor::connect(&pg_config.connection_config(&schema)?).await?;
    let range = RunRange::from_count(60)?;
    let mut driver = WorkloadDriver::new(
        executor,
        DriverConfig {
            seed: SEED,
            ..DriverConfig::default()
        },
    );
    let report = driver.run(range).await?;

    let plan = RunPlan::compute(SEED, range, LifecycleThresholds::default());
    assert_eq!(report.totals, plan.totals);

    let counts = row_counts_in_range(&client, &schema, 1, 60).await?;
    let expected = report.expected_surviving_rows();
    assert_eq!(
        counts,
        TableCounts {
            users: expected,
            products: expected
        }
    );

    for table in [USERS_TABLE, PRODUCTS_TABLE] {
        let present = ids_in_range(&client, &schema, table, 1, 60).await?;
        let result = verify_table(&plan, table, &present);
        assert!(result.is_success(), "{result:?}");
    }

    cleanup_schema(&client, &schema).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL server at POSTGRESQL_TEST_URL"]
async fn test_postgresql_duplicate_identity_rolls_back() -> anyhow::Result<()> {
    init_test_logging();
    let pg_config = create_postgres_config();
    let client = connect_test_client(&pg_config).await?;
    let schema = unique_schema_name("cdc_dup");
    provision_schema(&client, &schema).await?;

    let config = DriverConfig {
        seed: SEED,
        thresholds: LifecycleThresholds::new(101, 101)?,
        ..DriverConfig::default()
    };
    let range = RunRange::new(5, 1)?;

    let executor = PostgreSQLExecutor::connect(&pg_config.connection_config(&schema)?).await?;
    let mut driver = WorkloadDriver::new(executor, config.clone());
    driver.run(range).await?;

    let executor = PostgreSQLExecutor::connect(&pg_config.connection_config(&schema)?).await?;
    let mut driver = WorkloadDriver::new(executor, config);
    let err = driver.run(range).await.unwrap_err();
    assert!(matches!(
        err,
        DriverError::Aborted {
            id: 5,
            stage: Stage::Insert,
            source: ExecutorError::ConstraintViolation { .. },
            ..
        }
    ));

    let counts = row_counts_in_range(&client, &schema, 5, 5).await?;
    assert_eq!(
        counts,
        TableCounts {
            users: 1,
            products: 1
        }
    );

    cleanup_schema(&client, &schema).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL server at POSTGRESQL_TEST_URL"]
async fn test_postgresql_stages_on_missing_rows_are_noops() -> anyhow::Result<()> {
    init_test_logging();
    let pg_config = create_postgres_config();
    let client = connect_test_client(&pg_config).await?;
    let schema = unique_schema_name("cdc_noop");
    provision_schema(&client, &schema).await?;

    let mut executor =
        PostgreSQLExecutor::connect(&pg_config.connection_config(&schema)?).await?;
    let mut factory = RecordFactory::from_seed(SEED);
    let (user, product) = (factory.build_user(9), factory.build_product(9));

    executor.insert(&user, &product).await?;
    let updated = executor.update(9, 9, "renamed_user", "Renamed Product").await?;
    assert_eq!(updated.users_affected, 1);
    assert_eq!(updated.products_affected, 1);

    let row = client
        .query_one(
            &format!("SELECT username FROM \"{schema}\".users WHERE id = 9"),
            &[],
        )
        .await?;
    assert_eq!(row.get::<_, String>(0), "renamed_user");

    assert!(!executor.delete(9, 9).await?.is_noop());
    assert!(executor.delete(9, 9).await?.is_noop());
    assert!(executor.update(9, 9, "again", "Again").await?.is_noop());

    cleanup_schema(&client, &schema).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL server at POSTGRESQL_TEST_URL"]
async fn test_postgresql_preflight_reports_missing_tables() -> anyhow::Result<()> {
    init_test_logging();
    let pg_config = create_postgres_config();
    let client = connect_test_client(&pg_config).await?;
    let schema = unique_schema_name("cdc_empty");

    let missing = missing_tables(&client, &schema).await?;
    assert_eq!(missing, vec![USERS_TABLE.to_string(), PRODUCTS_TABLE.to_string()]);

    let result = PostgreSQLExecutor::connect(&pg_config.connection_config(&schema)?).await;
    assert!(matches!(
        result,
        Err(PostgreSQLExecutorError::MissingTables { .. })
    ));
    Ok(())
}
