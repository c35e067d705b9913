//! Generate command handler.

use crate::args::WorkloadArgs;
use crate::config::duration::parse_duration;
use anyhow::Context;
use clap::Args;
use datagen_generator::{Identity, RunRange};
use datagen_postgresql::{PostgreSQLArgs, PostgreSQLExecutor};
use datagen_workload::retry::DEFAULT_MAX_ATTEMPTS;
use datagen_workload::{
    DriverConfig, DriverError, DuplicatePolicy, InMemoryExecutor, MutationExecutor, Pacing,
    RetryingExecutor, RunReport, WorkloadDriver,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Arguments for the generate command.
#[derive(Args, Clone, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub workload: WorkloadArgs,

    /// Continue an interrupted run at this identity (identities before it are
    /// assumed committed)
    #[arg(long, value_name = "ID")]
    pub resume_from: Option<Identity>,

    /// Pause after each insert (e.g. "300ms", "1s", "2m"; a bare number is milliseconds)
    #[arg(long, default_value = "0", value_parser = parse_duration)]
    pub insert_pause: Duration,

    /// Pause after each update stage (e.g. "400ms"; a bare number is milliseconds)
    #[arg(long, default_value = "0", value_parser = parse_duration)]
    pub update_pause: Duration,

    /// Attempts per stage on connection errors (1 = no retry)
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Delay between attempts of a failed stage
    #[arg(long, value_parser = parse_duration, default_value = "2s")]
    pub retry_delay: Duration,

    /// Keep going when an identity already exists instead of aborting
    #[arg(long)]
    pub continue_on_duplicate: bool,

    /// Run against an in-memory store instead of PostgreSQL
    #[arg(long)]
    pub dry_run: bool,

    /// Write the run report as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    #[command(flatten)]
    pub postgresql: PostgreSQLArgs,
}

impl GenerateArgs {
    pub fn driver_config(&self) -> anyhow::Result<DriverConfig> {
        Ok(DriverConfig {
            seed: self.workload.seed,
            thresholds: self.workload.thresholds()?,
            pacing: Pacing {
                after_insert: self.insert_pause,
                after_update: self.update_pause,
            },
            on_duplicate: if self.continue_on_duplicate {
                DuplicatePolicy::Continue
            } else {
                DuplicatePolicy::Abort
            },
            ..DriverConfig::default()
        })
    }
}

/// Run the generate command.
pub async fn run_generate(args: GenerateArgs) -> anyhow::Result<RunReport> {
    let range = args.workload.range()?;
    let config = args.driver_config()?;

    let result = if args.dry_run {
        tracing::info!("Dry run: writing to an in-memory store");
        let executor = RetryingExecutor::new(
            InMemoryExecutor::new(),
            args.max_attempts,
            args.retry_delay,
        );
        execute(executor, config, range, args.resume_from).await
    } else {
        let connection = args.postgresql.connection_config()?;
        let executor = PostgreSQLExecutor::connect(&connection)
            .await
            .with_context(|| {
                format!("Failed to connect to PostgreSQL at {}", connection.display())
            })?;
        let executor = RetryingExecutor::new(executor, args.max_attempts, args.retry_delay);
        execute(executor, config, range, args.resume_from).await
    };

    match result {
        Ok(report) => {
            tracing::info!(
                "Expected change events per table: {}, surviving rows per table: {}",
                report.expected_change_events(),
                report.expected_surviving_rows()
            );
            if let Some(path) = &args.report {
                write_report(path, &report)?;
            }
            Ok(report)
        }
        Err(e) => {
            if let (Some(path), Some(partial)) = (&args.report, e.partial_report()) {
                write_report(path, partial)?;
            }
            Err(e.into())
        }
    }
}

async fn execute<E: MutationExecutor>(
    executor: E,
    config: DriverConfig,
    range: RunRange,
    resume_from: Option<Identity>,
) -> Result<RunReport, DriverError> {
    let mut driver = WorkloadDriver::new(executor, config);
    match resume_from {
        Some(id) => driver.resume(range, id).await,
        None => driver.run(range).await,
    }
}

/// Write a run report as pretty-printed JSON.
pub fn write_report(path: &Path, report: &RunReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write run report to {path:?}"))?;
    tracing::info!("Run report written to {:?}", path);
    Ok(())
}
