//! Bounded exponential-backoff retry for outbound calls.
//!
//! One helper, used by every call site that talks to the generation
//! provider or downloads assets: `max_attempts` tries with a doubling delay
//! between them. Failures after the last attempt are returned to the
//! caller, never swallowed.

use std::future::Future;
use std::time::Duration;

/// Tunable parameters for the backoff strategy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts (first try included).
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Calculate the delay preceding attempt `attempt` (1-based).
///
/// Attempt 1 has no delay; attempt 2 waits `base_delay`; each subsequent
/// attempt doubles, clamped to `max_delay`.
pub fn delay_for_attempt(attempt: u32, config: &RetryConfig) -> Duration {
    if attempt <= 1 {
        return Duration::ZERO;
    }
    let exp = attempt.saturating_sub(2).min(31);
    let millis = config.base_delay.as_millis() as u64;
    Duration::from_millis(millis.saturating_mul(1u64 << exp)).min(config.max_delay)
}

/// Run `op` with bounded exponential-backoff retry.
///
/// `op` is invoked up to `config.max_attempts` times. Intermediate failures
/// are logged at `warn`; the final failure is returned.
pub async fn with_backoff<T, E, F, Fut>(
    config: &RetryConfig,
    what: &str,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let delay = delay_for_attempt(attempt, config);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < config.max_attempts => {
                tracing::warn!(
                    attempt,
                    max_attempts = config.max_attempts,
                    error = %e,
                    "{what} failed, retrying"
                );
            }
            Err(e) => {
                tracing::error!(attempt, error = %e, "{what} failed after all retries");
                return Err(e);
            }
        }
    }
}
