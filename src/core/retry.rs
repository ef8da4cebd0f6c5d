//! Exponential-backoff retries around collaborator calls.

use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Backoff starting at 200ms, capped at 5s, with jitter.
pub fn backoff(max_times: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(200))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(max_times)
        .with_jitter()
}

/// Run `call` until it succeeds or `max_times` retries are spent.
pub async fn with_retry<T, F, Fut>(
    operation: &'static str,
    ticker: &str,
    max_times: usize,
    call: F,
) -> Result<T, BoxError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BoxError>>,
{
    call.retry(backoff(max_times))
        .notify(|err: &BoxError, delay: Duration| {
            warn!(
                ticker = %ticker,
                operation,
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "{} failed for {}, retrying in {:?}",
                operation,
                ticker,
                delay
            );
        })
        .await
}
