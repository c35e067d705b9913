//! Test infrastructure shared by unit and integration tests.
//!
//! Tests that need a live PostgreSQL read `POSTGRESQL_TEST_URL` and provision
//! a throwaway schema per test, so they can run in parallel.

pub mod postgresql;
pub mod test_helpers;

pub use test_helpers::{generate_test_id, init_test_logging, unique_schema_name};
