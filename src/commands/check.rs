//! Check command handler.

use anyhow::Context;
use datagen_postgresql::{check_connection, connect_client, missing_tables, PostgreSQLArgs};

/// Check that PostgreSQL is reachable and the target tables exist.
pub async fn run_check(args: PostgreSQLArgs) -> anyhow::Result<()> {
    let config = args.connection_config()?;
    let client = connect_client(&config)
        .await
        .with_context(|| format!("Failed to connect to PostgreSQL at {}", config.display()))?;

    check_connection(&client)
        .await
        .context("PostgreSQL did not answer SELECT 1")?;
    tracing::info!("PostgreSQL at {} is reachable", config.display());

    let missing = missing_tables(&client, config.schema()).await?;
    if !missing.is_empty() {
        anyhow::bail!(
            "Schema '{}' is missing tables: {}",
            config.schema(),
            missing.join(", ")
        );
    }
    tracing::info!("Schema '{}' has users and products tables", config.schema());
    println!("OK");
    Ok(())
}
