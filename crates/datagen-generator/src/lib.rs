//! Deterministic workload generation for cdc-datagen.
//!
//! This crate fabricates the `users`/`products` records and the lifecycle
//! decisions of a run. Nothing here performs I/O: given a seed, the sequence of
//! records, decisions and update values is fixed.
//!
//! # Architecture
//!
//! ```text
//!   seed ──┬── stream 0 ──► FakeValueProvider ──► RecordFactory ─┐
//!          │                                                     │
//!          └── stream 1 ──► LifecyclePolicy ─────────────────────┤
//!                                                                ▼
//!                                                      WorkloadGenerator
//!                                                                │
//!                                                                ▼
//!                            IdentityLifecycle { user, product, decision, update }
//! ```
//!
//! # Example
//!
//! ```rust
//! use datagen_generator::{LifecycleThresholds, RunRange, WorkloadGenerator};
//!
//! let range = RunRange::from_count(3).unwrap();
//! let mut generator = WorkloadGenerator::new(42, LifecycleThresholds::default());
//! for id in range.ids() {
//!     let lifecycle = generator.next_lifecycle(id);
//!     assert!(lifecycle.user.email.contains('@'));
//! }
//! ```

pub mod error;
pub mod generator;
pub mod lifecycle;
pub mod plan;
pub mod provider;
pub mod range;
pub mod records;

// Re-exports for convenience
pub use error::GeneratorError;
pub use generator::{IdentityLifecycle, RecordUpdate, WorkloadGenerator};
pub use lifecycle::{LifecycleDecision, LifecyclePolicy, LifecycleThresholds};
pub use plan::{PlannedIdentity, RunPlan, StageTotals};
pub use provider::FakeValueProvider;
pub use range::RunRange;
pub use records::{Identity, ProductRecord, RecordFactory, UserRecord};
