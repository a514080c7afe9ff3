//! Retry with exponential backoff for provider calls.
//!
//! The default policy is fail-fast (`max_retries: 0`): a provider error
//! surfaces on the first failure. Raising `max_retries` retries only
//! transient errors (see [`ProviderError::is_transient`]). A rate-limit
//! reply's `Retry-After` is a floor for the next delay.

use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::config::duration_str;
use crate::providers::ProviderError;

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 disables retry)
    pub max_retries: usize,

    /// First backoff delay
    #[serde(with = "duration_str")]
    pub min_delay: Duration,

    /// Backoff ceiling
    #[serde(with = "duration_str")]
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fail_fast()
    }
}

impl RetryPolicy {
    /// No retries.
    pub fn fail_fast() -> Self {
        Self {
            max_retries: 0,
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }

    /// Exponential backoff with the given retry count.
    pub fn with_retries(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Self::fail_fast()
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries)
            .with_jitter()
    }

    /// Run `op`, retrying transient failures according to this policy.
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        if self.max_retries == 0 {
            let mut op = op;
            return op().await;
        }

        op.retry(self.backoff())
            .when(ProviderError::is_transient)
            .adjust(delay_floor)
            .notify(|err: &ProviderError, delay: Duration| {
                tracing::warn!(error = %err, delay = ?delay, "Retrying provider call");
            })
            .await
    }
}

/// Wait at least as long as the provider asked. `None` means the retries
/// are used up and stays `None`.
fn delay_floor(err: &ProviderError, delay: Option<Duration>) -> Option<Duration> {
    match err {
        ProviderError::RateLimited {
            retry_after: Some(retry_after),
        } => delay.map(|d| d.max(*retry_after)),
        _ => delay,
    }
}
