//! In-process executor used for dry runs and tests.

use crate::executor::{ExecutorError, MutationExecutor, MutationOutcome, Stage};
use datagen_generator::{Identity, ProductRecord, UserRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One committed transaction, in commit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEntry {
    /// Position in the commit order, starting at 1.
    pub sequence: u64,
    pub stage: Stage,
    pub id: Identity,
    pub outcome: MutationOutcome,
}

/// Executor backed by two in-memory tables.
///
/// Mirrors the transactional contract of a real store: both rows of a stage
/// change together or not at all, a duplicate insert leaves the tables
/// untouched, and missing rows on update/delete are zero-row commits. Every
/// commit is appended to a log so tests can check ordering.
#[derive(Debug, Default)]
pub struct InMemoryExecutor {
    users: BTreeMap<Identity, UserRecord>,
    products: BTreeMap<Identity, ProductRecord>,
    log: Vec<CommitEntry>,
    faults: HashMap<(Stage, Identity), u32>,
}

impl InMemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `times` attempts of `stage` for `id` fail with a
    /// connection error before touching any row.
    pub fn inject_connection_failure(&mut self, stage: Stage, id: Identity, times: u32) {
        self.faults.insert((stage, id), times);
    }

    pub fn users(&self) -> &BTreeMap<Identity, UserRecord> {
        &self.users
    }

    pub fn products(&self) -> &BTreeMap<Identity, ProductRecord> {
        &self.products
    }

    pub fn user(&self, id: Identity) -> Option<&UserRecord> {
        self.users.get(&id)
    }

    pub fn product(&self, id: Identity) -> Option<&ProductRecord> {
        self.products.get(&id)
    }

    /// Committed transactions in commit order.
    pub fn commit_log(&self) -> &[CommitEntry] {
        &self.log
    }

    fn check_fault(&mut self, stage: Stage, id: Identity) -> Result<(), ExecutorError> {
        if let Some(remaining) = self.faults.get_mut(&(stage, id)) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ExecutorError::Connection(format!(
                    "injected failure for {stage} of identity {id}"
                )));
            }
        }
        Ok(())
    }

    fn commit(&mut self, stage: Stage, id: Identity, outcome: MutationOutcome) {
        let sequence = self.log.len() as u64 + 1;
        self.log.push(CommitEntry {
            sequence,
            stage,
            id,
            outcome,
        });
    }
}

#[async_trait::async_trait]
impl MutationExecutor for InMemoryExecutor {
    async fn insert(
        &mut self,
        user: &UserRecord,
        product: &ProductRecord,
    ) -> Result<(), ExecutorError> {
        self.check_fault(Stage::Insert, user.id)?;

        if self.users.contains_key(&user.id) {
            return Err(ExecutorError::ConstraintViolation {
                id: user.id,
                table: "users".to_string(),
                message: format!("key (id)=({}) already exists", user.id),
            });
        }
        if self.products.contains_key(&product.id) {
            return Err(ExecutorError::ConstraintViolation {
                id: product.id,
                table: "products".to_string(),
                message: format!("key (id)=({}) already exists", product.id),
            });
        }

        self.users.insert(user.id, user.clone());
        self.products.insert(product.id, product.clone());
        self.commit(
            Stage::Insert,
            user.id,
            MutationOutcome {
                users_affected: 1,
                products_affected: 1,
            },
        );
        Ok(())
    }

    async fn update(
        &mut self,
        user_id: Identity,
        product_id: Identity,
        new_username: &str,
        new_product_name: &str,
    ) -> Result<MutationOutcome, ExecutorError> {
        self.check_fault(Stage::Update, user_id)?;

        let mut outcome = MutationOutcome::default();
        if let Some(user) = self.users.get_mut(&user_id) {
            user.username = new_username.to_string();
            outcome.users_affected = 1;
        }
        if let Some(product) = self.products.get_mut(&product_id) {
            product.name = new_product_name.to_string();
            outcome.products_affected = 1;
        }
        self.commit(Stage::Update, user_id, outcome);
        Ok(outcome)
    }

    async fn delete(
        &mut self,
        user_id: Identity,
        product_id: Identity,
    ) -> Result<MutationOutcome, ExecutorError> {
        self.check_fault(Stage::Delete, user_id)?;

        let outcome = MutationOutcome {
            users_affected: u64::from(self.users.remove(&user_id).is_some()),
            products_affected: u64::from(self.products.remove(&product_id).is_some()),
        };
        self.commit(Stage::Delete, user_id, outcome);
        Ok(outcome)
    }
}
