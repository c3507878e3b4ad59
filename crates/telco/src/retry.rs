//! Bounded retry with exponential backoff.
//!
//! This is the sole resilience primitive in the system: every single
//! POST to the provider is wrapped in [`retry`]. Attempts are strictly
//! sequential; the only suspension point is the inter-attempt sleep.

use std::future::Future;
use std::time::Duration;

/// Tunable parameters for the backoff strategy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Factor by which the delay grows after each failed attempt.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    /// The gateway default: 3 attempts, 2s initial delay, x2 backoff
    /// (delays of 2s then 4s).
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(2000),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// The delay slept after failed attempt number `attempt` (1-based):
    /// `initial_delay * multiplier^(attempt - 1)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let millis = (self.initial_delay.as_millis() as f64 * factor) as u64;
        Duration::from_millis(millis)
    }
}

/// Run `op` up to `policy.max_attempts` times.
///
/// On a failure that is not the last attempt, `on_retry(attempt, &err)`
/// is invoked and the backoff delay is slept before trying again. The
/// final attempt's error is propagated unchanged.
pub async fn retry<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    mut on_retry: R,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: FnMut(u32, &E),
{
    let max_attempts = policy.max_attempts.max(1);

    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_attempts {
                    return Err(err);
                }
                on_retry(attempt, &err);
                tokio::time::sleep(policy.delay_after(attempt)).await;
            }
        }
    }
}
