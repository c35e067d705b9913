//! Summary of what a run committed.

use chrono::{DateTime, Utc};
use datagen_generator::{Identity, LifecycleThresholds, RunRange, StageTotals};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a run, for comparison against the events a capture pipeline
/// published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub seed: u64,
    /// Identities this run executed.
    pub range: RunRange,
    /// Set when earlier identities were replayed without executing.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resumed_from: Option<Identity>,
    pub thresholds: LifecycleThresholds,
    /// Committed stages. An insert rejected as duplicate is not counted.
    pub totals: StageTotals,
    /// Inserts rejected because the identity already existed.
    pub duplicates: u64,
    /// Updates that committed with zero rows affected.
    pub noop_updates: u64,
    /// Deletes that committed with zero rows affected.
    pub noop_deletes: u64,
    /// Stage attempts repeated by a retry wrapper.
    pub retries: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_committed_id: Option<Identity>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn start(seed: u64, range: RunRange, thresholds: LifecycleThresholds) -> Self {
        Self {
            seed,
            range,
            resumed_from: None,
            thresholds,
            totals: StageTotals::default(),
            duplicates: 0,
            noop_updates: 0,
            noop_deletes: 0,
            retries: 0,
            last_committed_id: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Identities whose whole lifecycle committed.
    pub fn completed_identities(&self) -> u64 {
        match self.last_committed_id {
            Some(last) => (last - self.range.first_id() + 1) as u64,
            None => 0,
        }
    }

    /// Change events expected per table: one per row-changing commit.
    pub fn expected_change_events(&self) -> u64 {
        self.totals.inserts
            + (self.totals.updates - self.noop_updates)
            + (self.totals.deletes - self.noop_deletes)
    }

    /// Rows of this run's range left in each table.
    pub fn expected_surviving_rows(&self) -> u64 {
        (self.totals.inserts + self.duplicates) - (self.totals.deletes - self.noop_deletes)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.finished_at
            .and_then(|finished| (finished - self.started_at).to_std().ok())
    }
}
