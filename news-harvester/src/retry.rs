use crate::config::RetryPolicy;
use crate::types::Result;
use backoff::{backoff::Backoff, exponential::ExponentialBackoff, SystemClock};
use std::future::Future;
use tracing::{debug, warn};

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBackoff<SystemClock> {
        ExponentialBackoff {
            current_interval: self.initial_delay,
            initial_interval: self.initial_delay,
            randomization_factor: 0.0,
            multiplier: self.multiplier,
            max_interval: self.max_delay.max(self.initial_delay),
            // Attempts are bounded by count, not elapsed time.
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// Runs `operation` up to `policy.max_attempts` times, sleeping with exponential
/// backoff between failures. The last failure is returned unchanged.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut backoff = policy.backoff();
    backoff.reset();

    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts => {
                let delay = backoff.next_backoff().unwrap_or(policy.max_delay);
                warn!(
                    "Attempt {}/{} failed for {}, retrying in {:?}: {}",
                    attempt, max_attempts, label, delay, e
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
            Err(e) => {
                warn!("{} failed after {} attempts: {}", label, max_attempts, e);
                return Err(e);
            }
        }
    }
}
