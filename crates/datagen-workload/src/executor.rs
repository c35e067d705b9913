//! The mutation executor contract.

use datagen_generator::{Identity, ProductRecord, UserRecord};
use serde::{Deserialize, Serialize};

/// One of the three lifecycle stages, applied in this order per identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Insert => write!(f, "insert"),
            Stage::Update => write!(f, "update"),
            Stage::Delete => write!(f, "delete"),
        }
    }
}

/// Rows touched by a committed update or delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub users_affected: u64,
    pub products_affected: u64,
}

impl MutationOutcome {
    /// Both targets were already gone. Not an error.
    pub fn is_noop(&self) -> bool {
        self.users_affected == 0 && self.products_affected == 0
    }
}

/// Errors reported by a [`MutationExecutor`].
///
/// Every variant means the transaction was rolled back.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// The identity already exists (uniqueness violation on insert).
    #[error("Duplicate identity {id} in table '{table}': {message}")]
    ConstraintViolation {
        id: Identity,
        table: String,
        message: String,
    },

    /// The store could not be reached or the connection dropped.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Any other statement failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl ExecutorError {
    /// Whether the run must stop.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ExecutorError::ConstraintViolation { .. })
    }

    /// Whether a retry of the same stage could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ExecutorError::Connection(_))
    }
}

/// Applies lifecycle stages to a backing store.
///
/// Each operation runs as one transaction covering the user row and the
/// product row: both statements commit together or neither does. Operations
/// take `&mut self` because a run owns its store session exclusively.
///
/// # Usage Pattern
///
/// The driver is generic over the executor, so the PostgreSQL executor, the
/// in-memory executor and the retry wrapper are interchangeable:
///
/// ```ignore
/// let executor = RetryingExecutor::new(PostgreSQLExecutor::connect(&config).await?, 3, delay);
/// let mut driver = WorkloadDriver::new(executor, DriverConfig::default());
/// let report = driver.run(RunRange::from_count(1000)?).await?;
/// ```
#[async_trait::async_trait]
pub trait MutationExecutor: Send {
    /// Insert both records in one transaction.
    ///
    /// A duplicate identity rolls back and returns
    /// [`ExecutorError::ConstraintViolation`].
    async fn insert(
        &mut self,
        user: &UserRecord,
        product: &ProductRecord,
    ) -> Result<(), ExecutorError>;

    /// Set the username and product name by identity in one transaction.
    ///
    /// Missing rows commit with zero rows affected.
    async fn update(
        &mut self,
        user_id: Identity,
        product_id: Identity,
        new_username: &str,
        new_product_name: &str,
    ) -> Result<MutationOutcome, ExecutorError>;

    /// Delete both rows by identity in one transaction.
    ///
    /// Missing rows commit with zero rows affected.
    async fn delete(
        &mut self,
        user_id: Identity,
        product_id: Identity,
    ) -> Result<MutationOutcome, ExecutorError>;

    /// Attempts that were repeated after a transient failure.
    fn retried_attempts(&self) -> u64 {
        0
    }
}
