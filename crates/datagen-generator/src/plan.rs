//! Store-free prediction of a run's lifecycle decisions.

use crate::lifecycle::{LifecycleDecision, LifecyclePolicy, LifecycleThresholds};
use crate::range::{stream_seed, RunRange, LIFECYCLE_STREAM};
use crate::records::Identity;
use serde::{Deserialize, Serialize};

/// Decision for one identity of a planned run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedIdentity {
    pub id: Identity,
    #[serde(flatten)]
    pub decision: LifecycleDecision,
}

/// Stage counts for a run, per table.
///
/// Every stage touches one row in `users` and one in `products`, so the same
/// numbers hold for both tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTotals {
    pub inserts: u64,
    pub updates: u64,
    pub deletes: u64,
}

impl StageTotals {
    pub fn record(&mut self, decision: LifecycleDecision) {
        self.inserts += 1;
        self.updates += u64::from(decision.will_update);
        self.deletes += u64::from(decision.will_delete);
    }

    /// Change events a capture pipeline should publish for each table.
    pub fn expected_change_events(&self) -> u64 {
        self.inserts + self.updates + self.deletes
    }

    /// Rows left in each table after the run.
    pub fn expected_surviving_rows(&self) -> u64 {
        self.inserts - self.deletes
    }
}

/// The decision sequence of a run, computed without fabricating records or
/// touching a store.
///
/// Decisions come from their own stream, so the plan for a seed matches what
/// [`crate::WorkloadGenerator`] decides for the same seed and thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPlan {
    pub seed: u64,
    pub range: RunRange,
    pub thresholds: LifecycleThresholds,
    pub totals: StageTotals,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub identities: Vec<PlannedIdentity>,
}

impl RunPlan {
    pub fn compute(seed: u64, range: RunRange, thresholds: LifecycleThresholds) -> Self {
        let mut policy = LifecyclePolicy::new(thresholds, stream_seed(seed, LIFECYCLE_STREAM));
        let mut totals = StageTotals::default();
        let identities = range
            .ids()
            .map(|id| {
                let decision = policy.decide();
                totals.record(decision);
                PlannedIdentity { id, decision }
            })
            .collect();

        Self {
            seed,
            range,
            thresholds,
            totals,
            identities,
        }
    }

    /// Drop the per-identity list, keeping only the totals.
    pub fn summary(mut self) -> Self {
        self.identities.clear();
        self
    }

    pub fn updated_ids(&self) -> impl Iterator<Item = Identity> + '_ {
        self.identities
            .iter()
            .filter(|p| p.decision.will_update)
            .map(|p| p.id)
    }

    pub fn deleted_ids(&self) -> impl Iterator<Item = Identity> + '_ {
        self.identities
            .iter()
            .filter(|p| p.decision.will_delete)
            .map(|p| p.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorkloadGenerator;

    #[test]
    fn test_plan_matches_generator() {
        let range = RunRange::from_count(300).unwrap();
        let thresholds = LifecycleThresholds::default();
        let plan = RunPlan::compute(42, range, thresholds);

        let mut generator = WorkloadGenerator::new(42, thresholds);
        for planned in &plan.identities {
            let lifecycle = generator.next_lifecycle(planned.id);
            assert_eq!(lifecycle.decision, planned.decision);
        }
    }

    #[test]
    fn test_totals() {
        let range = RunRange::from_count(1000).unwrap();
        let plan = RunPlan::compute(42, range, LifecycleThresholds::default());

        assert_eq!(plan.totals.inserts, 1000);
        assert_eq!(plan.totals.updates, plan.updated_ids().count() as u64);
        assert_eq!(plan.totals.deletes, plan.deleted_ids().count() as u64);
        assert_eq!(
            plan.totals.expected_change_events(),
            1000 + plan.totals.updates + plan.totals.deletes
        );
        assert_eq!(
            plan.totals.expected_surviving_rows(),
            1000 - plan.totals.deletes
        );
    }

    #[test]
    fn test_small_run_is_reproducible() {
        let range = RunRange::from_count(10).unwrap();
        let first = RunPlan::compute(42, range, LifecycleThresholds::default());
        let second = RunPlan::compute(42, range, LifecycleThresholds::default());

        assert_eq!(first, second);
        assert_eq!(first.identities.len(), 10);
        let ids: Vec<_> = first.identities.iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_summary_serialization() {
        let range = RunRange::from_count(5).unwrap();
        let plan = RunPlan::compute(1, range, LifecycleThresholds::default()).summary();
        let json = serde_json::to_value(&plan).unwrap();

        assert!(json.get("identities").is_none());
        assert_eq!(json["totals"]["inserts"], 5);
        assert_eq!(json["thresholds"]["update_threshold"], 90);
    }
}
