//! Workload driver for cdc-datagen.
//!
//! This crate turns the deterministic output of `datagen-generator` into
//! committed store operations. It defines the [`MutationExecutor`] contract
//! that every backing store implements and the [`WorkloadDriver`] that walks a
//! run's identities through insert, update and delete in a fixed order.
//!
//! # Architecture
//!
//! ```text
//!   WorkloadDriver ──► WorkloadGenerator (records, decisions)
//!         │
//!         ▼
//!   MutationExecutor ◄── RetryingExecutor<E> (optional wrapper)
//!         │
//!         ├── InMemoryExecutor     (dry runs, tests)
//!         └── PostgreSQLExecutor   (datagen-postgresql)
//! ```
//!
//! # Example
//!
//! ```rust
//! use datagen_generator::RunRange;
//! use datagen_workload::{DriverConfig, InMemoryExecutor, WorkloadDriver};
//!
//! # tokio_test::block_on(async {
//! let mut driver = WorkloadDriver::new(InMemoryExecutor::new(), DriverConfig::default());
//! let report = driver.run(RunRange::from_count(10).unwrap()).await.unwrap();
//! assert_eq!(report.totals.inserts, 10);
//! # });
//! ```

pub mod driver;
pub mod executor;
pub mod memory;
pub mod report;
pub mod retry;

pub use driver::{DriverConfig, DriverError, DuplicatePolicy, Pacing, WorkloadDriver, DEFAULT_SEED};
pub use executor::{ExecutorError, MutationExecutor, MutationOutcome, Stage};
pub use memory::{CommitEntry, InMemoryExecutor};
pub use report::RunReport;
pub use retry::RetryingExecutor;
