//! Arguments shared by the `generate`, `plan` and `verify` commands.

use clap::Args;
use datagen_generator::lifecycle::{DEFAULT_DELETE_THRESHOLD, DEFAULT_UPDATE_THRESHOLD};
use datagen_generator::{GeneratorError, LifecycleThresholds, RunRange};
use datagen_workload::DEFAULT_SEED;

/// Which identities a run covers and how their lifecycles are decided.
#[derive(Args, Clone, Debug)]
pub struct WorkloadArgs {
    /// Number of identities in the run
    #[arg(short = 'n', long, default_value = "10000")]
    pub num_records: u64,

    /// First identity of the run
    #[arg(long, default_value = "1")]
    pub start_id: i64,

    /// Random seed for record values and lifecycle decisions
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// An identity is updated when its draw in 1..=100 is at least this value
    #[arg(long, default_value_t = DEFAULT_UPDATE_THRESHOLD)]
    pub update_threshold: u32,

    /// An identity is deleted when its draw in 1..=100 is at least this value
    #[arg(long, default_value_t = DEFAULT_DELETE_THRESHOLD)]
    pub delete_threshold: u32,
}

impl WorkloadArgs {
    pub fn range(&self) -> Result<RunRange, GeneratorError> {
        RunRange::new(self.start_id, self.num_records)
    }

    pub fn thresholds(&self) -> Result<LifecycleThresholds, GeneratorError> {
        LifecycleThresholds::new(self.update_threshold, self.delete_threshold)
    }
}
