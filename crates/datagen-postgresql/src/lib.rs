//! PostgreSQL executor for cdc-datagen workloads.
//!
//! Writes `users` and `products` rows in a configurable schema, one
//! transaction per lifecycle stage, so a logical-decoding pipeline observes
//! each stage as a single commit.
//!
//! ```ignore
//! let config = args.connection_config()?;
//! let executor = PostgreSQLExecutor::connect(&config).await?;
//! let mut driver = WorkloadDriver::new(executor, DriverConfig::default());
//! driver.run(RunRange::from_count(10_000)?).await?;
//! ```

pub mod args;
pub mod error;
pub mod executor;
pub mod inspect;
pub mod statements;

pub use args::{mask_connection_password, ConnectionConfig, PostgreSQLArgs, DEFAULT_SCHEMA};
pub use error::PostgreSQLExecutorError;
pub use executor::PostgreSQLExecutor;
pub use inspect::{
    check_connection, connect_client, ensure_tables, ids_in_range, missing_tables,
    row_counts_in_range, TableCounts,
};
pub use statements::{qualified_table, quote_ident, StageSql, PRODUCTS_TABLE, USERS_TABLE};
