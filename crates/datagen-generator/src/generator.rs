//! Per-identity generation of records, decisions and update values.

use crate::lifecycle::{LifecycleDecision, LifecyclePolicy, LifecycleThresholds};
use crate::range::{stream_seed, LIFECYCLE_STREAM, VALUES_STREAM};
use crate::records::{Identity, ProductRecord, RecordFactory, UserRecord};
use serde::{Deserialize, Serialize};

/// New values written by an update stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub username: String,
    pub product_name: String,
}

/// Everything a run needs to drive one identity through its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityLifecycle {
    pub id: Identity,
    pub user: UserRecord,
    pub product: ProductRecord,
    pub decision: LifecycleDecision,
    /// Present exactly when `decision.will_update` is set.
    pub update: Option<RecordUpdate>,
}

/// Deterministic generator for a whole run.
///
/// Owns two independent seeded streams derived from the run seed: one for
/// fabricated values and one for lifecycle decisions. Identities must be
/// requested in run order; the content produced depends only on how many
/// identities were generated before, never on the identity value.
pub struct WorkloadGenerator {
    factory: RecordFactory,
    policy: LifecyclePolicy,
    generated: u64,
}

impl WorkloadGenerator {
    pub fn new(seed: u64, thresholds: LifecycleThresholds) -> Self {
        Self {
            factory: RecordFactory::from_seed(stream_seed(seed, VALUES_STREAM)),
            policy: LifecyclePolicy::new(thresholds, stream_seed(seed, LIFECYCLE_STREAM)),
            generated: 0,
        }
    }

    /// Generate the next identity's lifecycle.
    ///
    /// Provider calls happen in a fixed order: user, product, then the two
    /// update values when an update was decided.
    pub fn next_lifecycle(&mut self, id: Identity) -> IdentityLifecycle {
        let user = self.factory.build_user(id);
        let product = self.factory.build_product(id);
        let decision = self.policy.decide();
        let update = decision.will_update.then(|| RecordUpdate {
            username: self.factory.fresh_username(&user.username),
            product_name: self.factory.fresh_product_name(&product.name),
        });
        self.generated += 1;

        IdentityLifecycle {
            id,
            user,
            product,
            decision,
            update,
        }
    }

    /// Advance both streams past `count` identities without keeping results.
    pub fn skip(&mut self, count: u64) {
        for _ in 0..count {
            // The identity value does not influence content.
            self.next_lifecycle(0);
        }
    }

    /// Number of identities generated (or skipped) so far.
    pub fn generated(&self) -> u64 {
        self.generated
    }
}
