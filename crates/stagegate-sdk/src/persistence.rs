//! Store calls under the persistence policy

use std::future::Future;
use stagegate_repository::RepositoryResult;
use tracing::warn;

use crate::config::PersistencePolicy;
use crate::error::{Result, SdkError};

impl PersistencePolicy {
    /// Run a store call with a per-attempt timeout, retrying with a fixed backoff
    ///
    /// A timed-out attempt is cancelled before the next one starts. When every
    /// attempt fails the last failure is surfaced as `PersistenceUnavailable`.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RepositoryResult<T>>,
    {
        let attempts = self.attempts();
        let mut last_failure = String::new();

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => last_failure = e.to_string(),
                Err(_) => last_failure = format!("timed out after {:?}", self.timeout),
            }
            warn!(
                "{} failed (attempt {}/{}): {}",
                operation, attempt, attempts, last_failure
            );
            if attempt < attempts && !self.backoff.is_zero() {
                tokio::time::sleep(self.backoff).await;
            }
        }

        Err(SdkError::PersistenceUnavailable(format!(
            "{} failed after {} attempt(s): {}",
            operation, attempts, last_failure
        )))
    }
}
