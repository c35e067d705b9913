//! Transactional executor over tokio-postgres.

use crate::args::ConnectionConfig;
use crate::error::PostgreSQLExecutorError;
use crate::inspect::{check_connection, connect_client, ensure_tables};
use crate::statements::StageSql;
use datagen_generator::{Identity, ProductRecord, UserRecord};
use datagen_workload::{ExecutorError, MutationExecutor, MutationOutcome};
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, Statement, Transaction};
use tracing::{info, warn};

struct Statements {
    insert_user: Statement,
    insert_product: Statement,
    update_user: Statement,
    update_product: Statement,
    delete_user: Statement,
    delete_product: Statement,
}

impl Statements {
    async fn prepare(client: &Client, sql: &StageSql) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            insert_user: client.prepare(&sql.insert_user).await?,
            insert_product: client.prepare(&sql.insert_product).await?,
            update_user: client.prepare(&sql.update_user).await?,
            update_product: client.prepare(&sql.update_product).await?,
            delete_user: client.prepare(&sql.delete_user).await?,
            delete_product: client.prepare(&sql.delete_product).await?,
        })
    }
}

/// Applies each lifecycle stage as one transaction touching both tables.
///
/// Owns its client exclusively for the duration of a run. A transaction that
/// fails part-way is rolled back before the error is returned; a transaction
/// abandoned by cancellation rolls back when dropped.
pub struct PostgreSQLExecutor {
    client: Client,
    statements: Statements,
    schema: String,
}

impl PostgreSQLExecutor {
    /// Connect, verify the tables exist, and prepare the stage statements.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, PostgreSQLExecutorError> {
        let client = connect_client(config).await?;
        check_connection(&client).await?;
        ensure_tables(&client, config.schema()).await?;
        let executor = Self::with_client(client, config.schema()).await?;
        info!("PostgreSQL executor ready (schema '{}')", executor.schema);
        Ok(executor)
    }

    /// Build an executor over an existing client without the preflight checks.
    pub async fn with_client(client: Client, schema: &str) -> Result<Self, PostgreSQLExecutorError> {
        let statements = Statements::prepare(&client, &StageSql::for_schema(schema)).await?;
        Ok(Self {
            client,
            statements,
            schema: schema.to_string(),
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }
}

/// Map a driver error onto the executor contract.
fn classify(id: Identity, err: tokio_postgres::Error) -> ExecutorError {
    if let Some(db) = err.as_db_error() {
        let code = db.code();
        if *code == SqlState::UNIQUE_VIOLATION {
            return ExecutorError::ConstraintViolation {
                id,
                table: db.table().unwrap_or("unknown").to_string(),
                message: db.message().to_string(),
            };
        }
        // Class 08 is connection exceptions.
        if code.code().starts_with("08") || *code == SqlState::ADMIN_SHUTDOWN {
            return ExecutorError::Connection(err.to_string());
        }
        return ExecutorError::Store(err.to_string());
    }
    if is_transport_failure(&err) {
        return ExecutorError::Connection(err.to_string());
    }
    // Client-side failures such as parameter conversion would fail again.
    ExecutorError::Store(err.to_string())
}

fn is_transport_failure(err: &tokio_postgres::Error) -> bool {
    err.is_closed()
        || std::error::Error::source(err)
            .is_some_and(|source| source.downcast_ref::<std::io::Error>().is_some())
}

async fn finish<T>(
    tx: Transaction<'_>,
    id: Identity,
    result: Result<T, tokio_postgres::Error>,
) -> Result<T, ExecutorError> {
    match result {
        Ok(value) => {
            tx.commit().await.map_err(|e| classify(id, e))?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("Rollback for identity {} failed: {}", id, rollback_err);
            }
            Err(classify(id, e))
        }
    }
}

#[async_trait::async_trait]
impl MutationExecutor for PostgreSQLExecutor {
    async fn insert(
        &mut self,
        user: &UserRecord,
        product: &ProductRecord,
    ) -> Result<(), ExecutorError> {
        let id = user.id;
        let statements = &self.statements;
        let tx = self.client.transaction().await.map_err(|e| classify(id, e))?;

        let result = async {
            tx.execute(
                &statements.insert_user,
                &[&user.id, &user.username, &user.email],
            )
            .await?;
            tx.execute(
                &statements.insert_product,
                &[
                    &product.id,
                    &product.name,
                    &product.description,
                    &product.price,
                ],
            )
            .await?;
            Ok::<(), tokio_postgres::Error>(())
        }
        .await;

        finish(tx, id, result).await
    }

    async fn update(
        &mut self,
        user_id: Identity,
        product_id: Identity,
        new_username: &str,
        new_product_name: &str,
    ) -> Result<MutationOutcome, ExecutorError> {
        let statements = &self.statements;
        let tx = self
            .client
            .transaction()
            .await
            .map_err(|e| classify(user_id, e))?;

        let result = async {
            let users_affected = tx
                .execute(&statements.update_user, &[&user_id, &new_username])
                .await?;
            let products_affected = tx
                .execute(&statements.update_product, &[&product_id, &new_product_name])
                .await?;
            Ok::<_, tokio_postgres::Error>(MutationOutcome {
                users_affected,
                products_affected,
            })
        }
        .await;

        finish(tx, user_id, result).await
    }

    async fn delete(
        &mut self,
        user_id: Identity,
        product_id: Identity,
    ) -> Result<MutationOutcome, ExecutorError> {
        let statements = &self.statements;
        let tx = self
            .client
            .transaction()
            .await
            .map_err(|e| classify(user_id, e))?;

        let result = async {
            let users_affected = tx.execute(&statements.delete_user, &[&user_id]).await?;
            let products_affected = tx
                .execute(&statements.delete_product, &[&product_id])
                .await?;
            Ok::<_, tokio_postgres::Error>(MutationOutcome {
                users_affected,
                products_affected,
            })
        }
        .await;

        finish(tx, user_id, result).await
    }
}
