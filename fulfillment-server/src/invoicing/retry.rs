//! Retry-with-backoff combinator
//!
//! Shared by the render and delivery stages so neither hand-rolls its
//! own sleep loop.

use std::future::Future;
use std::time::Duration;

/// Pause policy between failed attempts
#[derive(Debug, Clone, Copy)]
pub enum Backoff {
    /// Same pause after every failed attempt
    Fixed(Duration),
    /// attempt_index × step (1-based): step, 2×step, ...
    Linear(Duration),
}

impl Backoff {
    fn delay(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(pause) => *pause,
            Backoff::Linear(step) => *step * attempt,
        }
    }
}

/// Run `op` up to `max_attempts` times, sleeping per `backoff` between
/// failed attempts. Returns the first success or the last error.
pub async fn retry_with_backoff<T, E, F, Fut>(
    label: &str,
    max_attempts: u32,
    backoff: Backoff,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts => {
                let delay = backoff.delay(attempt);
                tracing::warn!(
                    task = label,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::warn!(task = label, attempts = attempt, error = %err, "All attempts failed");
                return Err(err);
            }
        }
    }
}
