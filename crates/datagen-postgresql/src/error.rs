//! Error types for the PostgreSQL executor.

use thiserror::Error;

/// Errors raised while connecting to or inspecting the store.
///
/// Stage failures during a run are reported as
/// [`datagen_workload::ExecutorError`] instead.
#[derive(Error, Debug)]
pub enum PostgreSQLExecutorError {
    /// PostgreSQL connection or query error.
    #[error("PostgreSQL error: {0}")]
    PostgreSQL(#[from] tokio_postgres::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required tables are not provisioned.
    #[error("Missing tables in schema '{schema}': {}", tables.join(", "))]
    MissingTables { schema: String, tables: Vec<String> },
}
