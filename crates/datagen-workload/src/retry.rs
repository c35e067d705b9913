//! Retry wrapper around any executor.

use crate::executor::{ExecutorError, MutationExecutor, MutationOutcome, Stage};
use datagen_generator::{Identity, ProductRecord, UserRecord};
use std::time::Duration;
use tracing::{info, warn};

/// Default number of attempts per stage (no retry).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;
/// Default delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Retries transient failures of the wrapped executor.
///
/// Only [`ExecutorError::Connection`] is retried; constraint violations and
/// other store errors are returned on the first attempt. Each retried attempt
/// is logged with its attempt number and counted in
/// [`MutationExecutor::retried_attempts`], so retries stay distinguishable
/// from the stage counts of a run.
///
/// Retrying an insert whose commit succeeded but whose acknowledgement was
/// lost surfaces as a constraint violation on the next attempt.
pub struct RetryingExecutor<E> {
    inner: E,
    max_attempts: u32,
    delay: Duration,
    retried: u64,
}

impl<E: MutationExecutor> RetryingExecutor<E> {
    /// Wrap `inner`. `max_attempts` is clamped to at least 1.
    pub fn new(inner: E, max_attempts: u32, delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            delay,
            retried: 0,
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    /// Decide whether a failed attempt is retried, logging and counting it.
    fn should_retry(
        &mut self,
        stage: Stage,
        id: Identity,
        attempt: u32,
        error: &ExecutorError,
    ) -> bool {
        if !error.is_transient() || attempt >= self.max_attempts {
            return false;
        }
        warn!(
            "{} of identity {} failed (attempt {}/{}): {}. Retrying in {:?}...",
            stage, id, attempt, self.max_attempts, error, self.delay
        );
        self.retried += 1;
        true
    }

    fn finish<T>(
        stage: Stage,
        id: Identity,
        attempt: u32,
        result: Result<T, ExecutorError>,
    ) -> Result<T, ExecutorError> {
        if attempt > 1 && result.is_ok() {
            info!(
                "{} of identity {} succeeded after {} attempts",
                stage, id, attempt
            );
        }
        result
    }
}

#[async_trait::async_trait]
impl<E: MutationExecutor> MutationExecutor for RetryingExecutor<E> {
    async fn insert(
        &mut self,
        user: &UserRecord,
        product: &ProductRecord,
    ) -> Result<(), ExecutorError> {
        let mut attempt = 1;
        loop {
            let result = self.inner.insert(user, product).await;
            match result {
                Err(e) if self.should_retry(Stage::Insert, user.id, attempt, &e) => {
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                other => return Self::finish(Stage::Insert, user.id, attempt, other),
            }
        }
    }

    async fn update(
        &mut self,
        user_id: Identity,
        product_id: Identity,
        new_username: &str,
        new_product_name: &str,
    ) -> Result<MutationOutcome, ExecutorError> {
        let mut attempt = 1;
        loop {
            let result = self
                .inner
                .update(user_id, product_id, new_username, new_product_name)
                .await;
            match result {
                Err(e) if self.should_retry(Stage::Update, user_id, attempt, &e) => {
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                other => return Self::finish(Stage::Update, user_id, attempt, other),
            }
        }
    }

    async fn delete(
        &mut self,
        user_id: Identity,
        product_id: Identity,
    ) -> Result<MutationOutcome, ExecutorError> {
        let mut attempt = 1;
        loop {
            let result = self.inner.delete(user_id, product_id).await;
            match result {
                Err(e) if self.should_retry(Stage::Delete, user_id, attempt, &e) => {
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                other => return Self::finish(Stage::Delete, user_id, attempt, other),
            }
        }
    }

    fn retried_attempts(&self) -> u64 {
        self.retried + self.inner.retried_attempts()
    }
}
