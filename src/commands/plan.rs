//! Plan command handler.

use crate::args::WorkloadArgs;
use clap::Args;
use datagen_generator::RunPlan;

/// Arguments for the plan command.
#[derive(Args, Clone, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub workload: WorkloadArgs,

    /// Print only the totals, without the per-identity decisions
    #[arg(long)]
    pub summary: bool,
}

/// Compute the decisions of a run without touching a store.
pub fn compute_plan(args: &PlanArgs) -> anyhow::Result<RunPlan> {
    let plan = RunPlan::compute(
        args.workload.seed,
        args.workload.range()?,
        args.workload.thresholds()?,
    );
    Ok(if args.summary { plan.summary() } else { plan })
}

/// Run the plan command, printing the plan as JSON on stdout.
pub fn run_plan(args: PlanArgs) -> anyhow::Result<()> {
    let plan = compute_plan(&args)?;
    tracing::info!(
        "Plan for seed {}: {} inserts, {} updates, {} deletes",
        plan.seed,
        plan.totals.inserts,
        plan.totals.updates,
        plan.totals.deletes
    );
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
