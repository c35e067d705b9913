//! Workload integration tests.
//!
//! The in-memory tests run everywhere. The PostgreSQL tests need a server at
//! `POSTGRESQL_TEST_URL` and are ignored by default.

mod memory_workload;
mod postgresql_workload;
