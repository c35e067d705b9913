//! The workload driver: walks a run's identities through their lifecycle.

use crate::executor::{ExecutorError, MutationExecutor, Stage};
use crate::report::RunReport;
use datagen_generator::{
    GeneratorError, Identity, IdentityLifecycle, LifecycleThresholds, RunRange, WorkloadGenerator,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Seed used when a run does not specify one.
pub const DEFAULT_SEED: u64 = 42;

/// Identities between two progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

/// What to do when an insert hits an existing identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Stop the run.
    #[default]
    Abort,
    /// Keep the existing rows and continue the identity's lifecycle.
    Continue,
}

/// Delays that simulate a slow producer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after the insert stage.
    pub after_insert: Duration,
    /// Pause after the update stage, whether or not an update happened.
    pub after_update: Duration,
}

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub seed: u64,
    pub thresholds: LifecycleThresholds,
    pub pacing: Pacing,
    pub on_duplicate: DuplicatePolicy,
    pub progress_interval: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            thresholds: LifecycleThresholds::default(),
            pacing: Pacing::default(),
            on_duplicate: DuplicatePolicy::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Errors that end a run.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// A stage failed; identities before `id` are fully committed. When the
    /// failure was in the update or delete stage, the insert of `id` has
    /// committed too, which [`WorkloadDriver::resume`] tolerates.
    #[error("Run aborted at identity {id} during {stage} stage (resume with --resume-from {id})")]
    Aborted {
        id: Identity,
        stage: Stage,
        #[source]
        source: ExecutorError,
        /// What committed before the failure.
        report: Box<RunReport>,
    },

    #[error("Invalid run configuration: {0}")]
    Generator(#[from] GeneratorError),
}

impl DriverError {
    /// The identity to resume from, if the run got that far.
    pub fn failed_identity(&self) -> Option<Identity> {
        match self {
            DriverError::Aborted { id, .. } => Some(*id),
            DriverError::Generator(_) => None,
        }
    }

    pub fn partial_report(&self) -> Option<&RunReport> {
        match self {
            DriverError::Aborted { report, .. } => Some(report),
            DriverError::Generator(_) => None,
        }
    }
}

/// Drives identities through insert, optional update and optional delete.
///
/// Identities are processed strictly in increasing order, and each identity's
/// stages run to commit before the next identity starts, so the store's change
/// log is a single total order that downstream verification can predict from
/// the seed.
///
/// Successive calls to [`WorkloadDriver::run`] continue the same random
/// streams: running `1..=10` then `11..=20` produces the same operations as
/// running `1..=20` once.
pub struct WorkloadDriver<E> {
    executor: E,
    generator: WorkloadGenerator,
    config: DriverConfig,
}

impl<E: MutationExecutor> WorkloadDriver<E> {
    pub fn new(executor: E, config: DriverConfig) -> Self {
        let generator = WorkloadGenerator::new(config.seed, config.thresholds);
        Self {
            executor,
            generator,
            config,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Replay the random draws of `count` identities without executing them.
    pub fn fast_forward(&mut self, count: u64) {
        debug!("Fast-forwarding generator past {} identities", count);
        self.generator.skip(count);
    }

    /// Run every identity of `range`.
    pub async fn run(&mut self, range: RunRange) -> Result<RunReport, DriverError> {
        let report = RunReport::start(self.config.seed, range, self.config.thresholds);
        self.drive(range, report, None).await
    }

    /// Continue an interrupted run of `range` at `resume_from`.
    ///
    /// Identities before `resume_from` are assumed committed; their draws are
    /// replayed so the remaining identities get exactly the values the
    /// uninterrupted run would have produced. Call on a fresh driver.
    ///
    /// The run may have failed after `resume_from` was inserted. A duplicate on
    /// that identity's own insert is therefore taken as already committed, and
    /// its update and delete stages still run, whatever the duplicate policy.
    pub async fn resume(
        &mut self,
        range: RunRange,
        resume_from: Identity,
    ) -> Result<RunReport, DriverError> {
        let skipped = range.position_of(resume_from)?;
        let remaining = RunRange::new(resume_from, range.count() - skipped)?;

        info!(
            "Resuming run at identity {} ({} identities already committed)",
            resume_from, skipped
        );
        self.fast_forward(skipped);

        let mut report = RunReport::start(self.config.seed, remaining, self.config.thresholds);
        report.resumed_from = Some(resume_from);
        self.drive(remaining, report, Some(resume_from)).await
    }

    async fn drive(
        &mut self,
        range: RunRange,
        mut report: RunReport,
        maybe_inserted: Option<Identity>,
    ) -> Result<RunReport, DriverError> {
        info!(
            "Starting run: {} identities from {} (seed={}, update>={}, delete>={})",
            range.count(),
            range.first_id(),
            self.config.seed,
            self.config.thresholds.update_threshold,
            self.config.thresholds.delete_threshold
        );

        for id in range.ids() {
            let lifecycle = self.generator.next_lifecycle(id);

            let resumed = maybe_inserted == Some(id);
            if let Err((stage, source)) = self.process(&lifecycle, resumed, &mut report).await {
                report.retries = self.executor.retried_attempts();
                report.finish();
                return Err(DriverError::Aborted {
                    id,
                    stage,
                    source,
                    report: Box::new(report),
                });
            }
            report.last_committed_id = Some(id);

            let done = report.completed_identities();
            if self.config.progress_interval > 0 && done % self.config.progress_interval == 0 {
                info!(
                    "Progress: {}/{} identities ({} updated, {} deleted)",
                    done,
                    range.count(),
                    report.totals.updates,
                    report.totals.deletes
                );
            }
        }

        report.retries = self.executor.retried_attempts();
        report.finish();
        info!(
            "Run complete: {} inserted, {} updated, {} deleted, {} duplicates, {} retries",
            report.totals.inserts,
            report.totals.updates,
            report.totals.deletes,
            report.duplicates,
            report.retries
        );
        Ok(report)
    }

    /// Apply one identity's stages in order.
    ///
    /// `resumed` marks the identity a resume starts at, whose insert may have
    /// committed before the interruption.
    async fn process(
        &mut self,
        lifecycle: &IdentityLifecycle,
        resumed: bool,
        report: &mut RunReport,
    ) -> Result<(), (Stage, ExecutorError)> {
        let id = lifecycle.id;

        let inserted = self
            .executor
            .insert(&lifecycle.user, &lifecycle.product)
            .await;
        match inserted {
            Ok(()) => {
                debug!("Inserted identity {}", id);
                report.totals.inserts += 1;
            }
            Err(e @ ExecutorError::ConstraintViolation { .. }) if resumed => {
                info!(
                    "Identity {} was inserted before the interruption, continuing its lifecycle: {}",
                    id, e
                );
                report.duplicates += 1;
            }
            Err(e @ ExecutorError::ConstraintViolation { .. })
                if self.config.on_duplicate == DuplicatePolicy::Continue =>
            {
                warn!("Identity {} already exists, continuing: {}", id, e);
                report.duplicates += 1;
            }
            Err(e) => return Err((Stage::Insert, e)),
        }
        pause(self.config.pacing.after_insert).await;

        if let Some(update) = &lifecycle.update {
            let outcome = self
                .executor
                .update(id, id, &update.username, &update.product_name)
                .await
                .map_err(|e| (Stage::Update, e))?;
            debug!("Updated identity {} ({:?})", id, outcome);
            report.totals.updates += 1;
            if outcome.is_noop() {
                report.noop_updates += 1;
            }
        }
        pause(self.config.pacing.after_update).await;

        if lifecycle.decision.will_delete {
            let outcome = self
                .executor
                .delete(id, id)
                .await
                .map_err(|e| (Stage::Delete, e))?;
            debug!("Deleted identity {} ({:?})", id, outcome);
            report.totals.deletes += 1;
            if outcome.is_noop() {
                report.noop_deletes += 1;
            }
        }

        Ok(())
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
