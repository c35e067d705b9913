//! cdc-datagen library
//!
//! Drives a deterministic insert/update/delete workload against PostgreSQL so
//! that a change-data-capture pipeline has a predictable stream of events to
//! publish.
//!
//! # Features
//!
//! - Reproducible runs: the same seed and range fabricate the same records and
//!   the same lifecycle decisions
//! - Transactional stages: each insert, update and delete touches the users and
//!   products tables in one commit
//! - Resumable runs: an aborted run names the identity to continue from
//! - Offline planning and post-run verification against the expected survivors
//!
//! # Workspace Crates
//!
//! - `datagen_generator` - fake values, record factory, lifecycle policy, plans
//! - `datagen_workload` - executor contract, workload driver, retry wrapper
//! - `datagen_postgresql` - the tokio-postgres executor
//!
//! # CLI Usage
//!
//! ```bash
//! # 10,000 identities against the commerce schema
//! cdc-datagen generate --num-records 10000 --insert-pause 300ms --update-pause 400ms
//!
//! # Continue after an abort at identity 4312
//! cdc-datagen generate --num-records 10000 --resume-from 4312
//!
//! # Expected totals for a seed, without a database
//! cdc-datagen plan --num-records 10000 --summary
//! ```

pub mod args;
pub mod commands;
pub mod config;
pub mod testing;
pub mod verify;

pub use args::WorkloadArgs;
pub use verify::{verify_table, VerificationReport, VerificationResult};
