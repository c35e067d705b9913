//! Verify command handler.

use crate::args::WorkloadArgs;
use crate::verify::{verify_table, VerificationReport};
use anyhow::Context;
use clap::Args;
use datagen_generator::RunPlan;
use datagen_postgresql::{
    connect_client, ensure_tables, ids_in_range, PostgreSQLArgs, PRODUCTS_TABLE, USERS_TABLE,
};

/// Arguments for the verify command.
#[derive(Args, Clone, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub workload: WorkloadArgs,

    #[command(flatten)]
    pub postgresql: PostgreSQLArgs,
}

/// Compare the rows surviving in PostgreSQL against the plan of a completed run.
pub async fn run_verify(args: VerifyArgs) -> anyhow::Result<VerificationReport> {
    let range = args.workload.range()?;
    let Some(last_id) = range.last_id() else {
        anyhow::bail!("Nothing to verify: the run covers no identities");
    };
    let plan = RunPlan::compute(args.workload.seed, range, args.workload.thresholds()?);

    let config = args.postgresql.connection_config()?;
    let client = connect_client(&config)
        .await
        .with_context(|| format!("Failed to connect to PostgreSQL at {}", config.display()))?;
    ensure_tables(&client, config.schema()).await?;

    let mut tables = Vec::new();
    for table in [USERS_TABLE, PRODUCTS_TABLE] {
        let present = ids_in_range(&client, config.schema(), table, range.first_id(), last_id)
            .await
            .with_context(|| format!("Failed to read ids from table '{table}'"))?;
        let result = verify_table(&plan, table, &present);
        tracing::info!(
            "Table '{}': expected {}, found {}, missing {}, unexpected {}",
            result.table_name,
            result.expected,
            result.found,
            result.missing,
            result.unexpected
        );
        tables.push(result);
    }

    let report = VerificationReport::new(&plan, tables);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.passed {
        anyhow::bail!("Verification failed for seed {}", report.seed);
    }
    Ok(report)
}
