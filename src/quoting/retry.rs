use std::{fmt::Display, future::Future, time::Duration};

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::quoting::constants::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS, TRANSIENT_RPC_MARKERS,
};

/// Returns true if the error message looks like a transient RPC failure worth retrying.
pub fn is_transient_rpc_error(message: &str) -> bool {
    TRANSIENT_RPC_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Bounded retry with exponential backoff for flaky chain reads.
///
/// Only errors classified by [`is_transient_rpc_error`] are retried; anything else is returned on
/// the spot. The delay before retry `n` (zero-indexed) is `min(base_delay * 2^n, max_delay)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize) -> Self {
        Self { max_attempts, ..Default::default() }
    }

    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        u32::try_from(attempt)
            .ok()
            .and_then(|shift| 1u32.checked_shl(shift))
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Runs `op` until it succeeds, fails with a non-transient error, or runs out of attempts.
    ///
    /// The error returned is always the one produced by the last attempt. A `max_attempts` of zero
    /// still runs the operation once.
    pub async fn run<F, Fut, T, E>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let message = err.to_string();
                    if !is_transient_rpc_error(&message) {
                        debug!(
                            attempt = attempt + 1,
                            error = %message,
                            "Non-transient error, not retrying"
                        );
                        return Err(err);
                    }
                    if attempt + 1 >= attempts {
                        warn!(attempts, error = %message, "Retries exhausted");
                        return Err(err);
                    }
                    let delay = self.backoff_delay(attempt);
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %message,
                        "Transient RPC error, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Retries `op` with the default backoff schedule (1s, 2s, 4s, 8s, 8s, ...).
pub async fn with_retry<F, Fut, T, E>(op: F, max_attempts: usize) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    RetryPolicy::new(max_attempts)
        .run(op)
        .await
}
