//! Compare the rows left in the store against a run's plan.

use datagen_generator::{Identity, RunPlan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ids listed per discrepancy, at most.
pub const MAX_LISTED_IDS: usize = 20;

/// Verification outcome for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Table name
    pub table_name: String,
    /// Rows the plan leaves in the range
    pub expected: u64,
    /// Rows found in the range
    pub found: u64,
    /// Surviving identities that are absent
    pub missing: u64,
    /// Deleted identities that are still present
    pub unexpected: u64,
    /// First few missing ids
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub missing_ids: Vec<Identity>,
    /// First few unexpected ids
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub unexpected_ids: Vec<Identity>,
}

impl VerificationResult {
    pub fn is_success(&self) -> bool {
        self.missing == 0 && self.unexpected == 0
    }
}

/// Verification outcome for a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub seed: u64,
    pub first_id: Identity,
    pub count: u64,
    /// Results per table
    pub tables: Vec<VerificationResult>,
    pub passed: bool,
}

impl VerificationReport {
    pub fn new(plan: &RunPlan, tables: Vec<VerificationResult>) -> Self {
        let passed = tables.iter().all(VerificationResult::is_success);
        Self {
            seed: plan.seed,
            first_id: plan.range.first_id(),
            count: plan.range.count(),
            tables,
            passed,
        }
    }
}

/// Check `present` (ids found in `table` over the plan's range) against the
/// identities the plan expects to survive.
///
/// The plan must carry its per-identity list.
pub fn verify_table(plan: &RunPlan, table: &str, present: &[Identity]) -> VerificationResult {
    let present: BTreeSet<Identity> = present.iter().copied().collect();

    let mut result = VerificationResult {
        table_name: table.to_string(),
        expected: plan.totals.expected_surviving_rows(),
        found: present.len() as u64,
        missing: 0,
        unexpected: 0,
        missing_ids: Vec::new(),
        unexpected_ids: Vec::new(),
    };

    for planned in &plan.identities {
        let found = present.contains(&planned.id);
        if planned.decision.will_delete && found {
            result.unexpected += 1;
            if result.unexpected_ids.len() < MAX_LISTED_IDS {
                result.unexpected_ids.push(planned.id);
            }
        } else if !planned.decision.will_delete && !found {
            result.missing += 1;
            if result.missing_ids.len() < MAX_LISTED_IDS {
                result.missing_ids.push(planned.id);
            }
        }
    }

    result
}
