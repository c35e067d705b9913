//! Per-identity lifecycle decisions.

use crate::GeneratorError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Lowest value of a lifecycle draw.
pub const DRAW_MIN: u32 = 1;
/// Highest value of a lifecycle draw.
pub const DRAW_MAX: u32 = 100;

/// Default threshold at or above which an identity is updated.
pub const DEFAULT_UPDATE_THRESHOLD: u32 = 90;
/// Default threshold at or above which an identity is deleted.
pub const DEFAULT_DELETE_THRESHOLD: u32 = 95;

/// Thresholds for the two lifecycle trials.
///
/// A stage happens when its draw in `1..=100` is greater than or equal to the
/// threshold. A threshold of 1 always fires; 101 never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleThresholds {
    pub update_threshold: u32,
    pub delete_threshold: u32,
}

impl Default for LifecycleThresholds {
    fn default() -> Self {
        Self {
            update_threshold: DEFAULT_UPDATE_THRESHOLD,
            delete_threshold: DEFAULT_DELETE_THRESHOLD,
        }
    }
}

impl LifecycleThresholds {
    pub fn new(update_threshold: u32, delete_threshold: u32) -> Result<Self, GeneratorError> {
        for (name, value) in [
            ("update", update_threshold),
            ("delete", delete_threshold),
        ] {
            if !(DRAW_MIN..=DRAW_MAX + 1).contains(&value) {
                return Err(GeneratorError::InvalidThreshold {
                    name,
                    value,
                    max: DRAW_MAX + 1,
                });
            }
        }
        Ok(Self {
            update_threshold,
            delete_threshold,
        })
    }

    /// Probability that a single trial with `threshold` fires.
    pub fn probability(threshold: u32) -> f64 {
        let hits = (DRAW_MAX + 1).saturating_sub(threshold.max(DRAW_MIN));
        f64::from(hits) / f64::from(DRAW_MAX)
    }
}

/// Outcome of the two lifecycle trials for one identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleDecision {
    pub will_update: bool,
    pub will_delete: bool,
}

/// Draws lifecycle decisions from its own seeded stream.
///
/// Update and delete are independent trials: a delete can be decided whether
/// or not an update was.
pub struct LifecyclePolicy {
    thresholds: LifecycleThresholds,
    rng: StdRng,
}

impl LifecyclePolicy {
    pub fn new(thresholds: LifecycleThresholds, seed: u64) -> Self {
        Self {
            thresholds,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn decide(&mut self) -> LifecycleDecision {
        let update_draw = self.rng.gen_range(DRAW_MIN..=DRAW_MAX);
        let delete_draw = self.rng.gen_range(DRAW_MIN..=DRAW_MAX);
        LifecycleDecision {
            will_update: update_draw >= self.thresholds.update_threshold,
            will_delete: delete_draw >= self.thresholds.delete_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let thresholds = LifecycleThresholds::default();
        assert_eq!(thresholds.update_threshold, 90);
        assert_eq!(thresholds.delete_threshold, 95);
        assert!((LifecycleThresholds::probability(90) - 0.11).abs() < 1e-9);
        assert!((LifecycleThresholds::probability(95) - 0.06).abs() < 1e-9);
        assert_eq!(LifecycleThresholds::probability(101), 0.0);
        assert_eq!(LifecycleThresholds::probability(1), 1.0);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(LifecycleThresholds::new(1, 101).is_ok());
        assert!(matches!(
            LifecycleThresholds::new(0, 95),
            Err(GeneratorError::InvalidThreshold { name: "update", .. })
        ));
        assert!(matches!(
            LifecycleThresholds::new(90, 102),
            Err(GeneratorError::InvalidThreshold { name: "delete", .. })
        ));
    }

    #[test]
    fn test_decisions_are_deterministic() {
        let mut a = LifecyclePolicy::new(LifecycleThresholds::default(), 42);
        let mut b = LifecyclePolicy::new(LifecycleThresholds::default(), 42);

        let left: Vec<_> = (0..500).map(|_| a.decide()).collect();
        let right: Vec<_> = (0..500).map(|_| b.decide()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_extreme_thresholds() {
        let mut always = LifecyclePolicy::new(LifecycleThresholds::new(1, 1).unwrap(), 3);
        let mut never = LifecyclePolicy::new(LifecycleThresholds::new(101, 101).unwrap(), 3);

        for _ in 0..100 {
            assert_eq!(
                always.decide(),
                LifecycleDecision {
                    will_update: true,
                    will_delete: true
                }
            );
            assert_eq!(never.decide(), LifecycleDecision::default());
        }
    }

    #[test]
    fn test_rates_converge() {
        let mut policy = LifecyclePolicy::new(LifecycleThresholds::default(), 42);
        let trials = 100_000;
        let mut updates = 0u32;
        let mut deletes = 0u32;
        let mut both = 0u32;

        for _ in 0..trials {
            let decision = policy.decide();
            updates += u32::from(decision.will_update);
            deletes += u32::from(decision.will_delete);
            both += u32::from(decision.will_update && decision.will_delete);
        }

        let update_rate = f64::from(updates) / f64::from(trials);
        let delete_rate = f64::from(deletes) / f64::from(trials);
        let both_rate = f64::from(both) / f64::from(trials);

        assert!((update_rate - 0.11).abs() < 0.01, "update rate {update_rate}");
        assert!((delete_rate - 0.06).abs() < 0.01, "delete rate {delete_rate}");
        // Independent trials: joint rate is the product of the marginals.
        assert!((both_rate - 0.11 * 0.06).abs() < 0.005, "joint rate {both_rate}");
    }
}
