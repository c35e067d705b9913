//! Connection setup and read-only queries against the target schema.

use crate::args::ConnectionConfig;
use crate::error::PostgreSQLExecutorError;
use crate::statements::{count_in_range_sql, ids_in_range_sql, PRODUCTS_TABLE, USERS_TABLE};
use datagen_generator::Identity;
use serde::Serialize;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, info};

/// Open a client and spawn its connection task.
pub async fn connect_client(config: &ConnectionConfig) -> Result<Client, PostgreSQLExecutorError> {
    info!("Connecting to PostgreSQL at {}", config.display());
    let (client, connection) = config.pg_config().connect(NoTls).await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    Ok(client)
}

/// Round-trip a trivial query.
pub async fn check_connection(client: &Client) -> Result<(), PostgreSQLExecutorError> {
    client.simple_query("SELECT 1").await?;
    Ok(())
}

/// Names of the `users`/`products` tables absent from `schema`.
pub async fn missing_tables(
    client: &Client,
    schema: &str,
) -> Result<Vec<String>, PostgreSQLExecutorError> {
    let rows = client
        .query(
            "SELECT table_name::TEXT FROM information_schema.tables \
             WHERE table_schema = $1::TEXT AND table_name IN ($2::TEXT, $3::TEXT)",
            &[&schema, &USERS_TABLE, &PRODUCTS_TABLE],
        )
        .await?;
    let present: Vec<String> = rows.iter().map(|row| row.get(0)).collect();

    Ok([USERS_TABLE, PRODUCTS_TABLE]
        .into_iter()
        .filter(|table| !present.iter().any(|p| p == table))
        .map(str::to_string)
        .collect())
}

/// Fail with [`PostgreSQLExecutorError::MissingTables`] unless both tables exist.
pub async fn ensure_tables(client: &Client, schema: &str) -> Result<(), PostgreSQLExecutorError> {
    let tables = missing_tables(client, schema).await?;
    if !tables.is_empty() {
        return Err(PostgreSQLExecutorError::MissingTables {
            schema: schema.to_string(),
            tables,
        });
    }
    debug!("Schema '{}' has users and products tables", schema);
    Ok(())
}

/// Row counts of both tables over an id range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub users: u64,
    pub products: u64,
}

pub async fn row_counts_in_range(
    client: &Client,
    schema: &str,
    first_id: Identity,
    last_id: Identity,
) -> Result<TableCounts, PostgreSQLExecutorError> {
    Ok(TableCounts {
        users: count_in_range(client, schema, USERS_TABLE, first_id, last_id).await?,
        products: count_in_range(client, schema, PRODUCTS_TABLE, first_id, last_id).await?,
    })
}

async fn count_in_range(
    client: &Client,
    schema: &str,
    table: &str,
    first_id: Identity,
    last_id: Identity,
) -> Result<u64, PostgreSQLExecutorError> {
    let row = client
        .query_one(&count_in_range_sql(schema, table), &[&first_id, &last_id])
        .await?;
    let count: i64 = row.get(0);
    Ok(count as u64)
}

/// Ids present in `table` over an id range, ascending.
pub async fn ids_in_range(
    client: &Client,
    schema: &str,
    table: &str,
    first_id: Identity,
    last_id: Identity,
) -> Result<Vec<Identity>, PostgreSQLExecutorError> {
    let rows = client
        .query(&ids_in_range_sql(schema, table), &[&first_id, &last_id])
        .await?;
    Ok(rows.iter().map(|row| row.get(0)).collect())
}
