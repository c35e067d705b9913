//! Shared test helpers for integration tests

use std::sync::atomic::{AtomicU64, Ordering};

// Generate unique test identifiers for parallel execution
static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique test identifier for parallel test execution
pub fn generate_test_id() -> u64 {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    timestamp.wrapping_add(counter)
}

/// Schema name that no other test uses.
pub fn unique_schema_name(prefix: &str) -> String {
    format!("{prefix}_{}", generate_test_id())
}

/// Install a test subscriber; repeated calls are ignored.
pub fn init_test_logging() {
    tracing_subscriber::fmt()
        .with_env_filter("cdc_datagen=info,datagen_workload=info,datagen_postgresql=info")
        .try_init()
        .ok();
}
