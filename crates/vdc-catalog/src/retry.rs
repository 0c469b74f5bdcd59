//! Exponential backoff retry for upstream catalog requests.
//!
//! Retries transient failures (HTTP 429/503, connection or timeout errors).
//! Everything else, including application-level error payloads, is returned
//! immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::CatalogError;

/// Retry settings handed to every client at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Base delay: the wait after attempt `n` is `backoff_base_ms * 2^n`.
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    /// Delay to wait after the failed 0-based `attempt` before trying again.
    ///
    /// | Attempt | Delay (`backoff_base_ms = 1000`) |
    /// |---------|----------------------------------|
    /// | 0       | 1 000 ms                         |
    /// | 1       | 2 000 ms                         |
    /// | 2       | 4 000 ms                         |
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let ms = self
            .backoff_base_ms
            .saturating_mul(1u64 << attempt.min(62));
        Duration::from_millis(ms)
    }
}

/// Returns `true` if `err` should be retried after a backoff delay.
pub(crate) fn is_retriable(err: &CatalogError) -> bool {
    match err {
        CatalogError::TransientStatus { .. } => true,
        CatalogError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        _ => false,
    }
}

/// Runs `operation` until it succeeds, fails with a non-retriable error, or
/// `policy.max_retries` retries are used up. The last error is returned on
/// exhaustion.
///
/// `operation` receives the 0-based attempt number so it can log it.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retriable(&err) || attempt >= policy.max_retries {
            return Err(err);
        }

        let delay = policy.delay_for(attempt);
        #[allow(clippy::cast_possible_truncation)]
        let delay_ms = delay.as_millis() as u64;
        tracing::warn!(
            attempt,
            max_retries = policy.max_retries,
            delay_ms,
            error = %err,
            "transient upstream error, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
