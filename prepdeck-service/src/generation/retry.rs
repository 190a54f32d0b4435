//! Parameterized retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry envelope for transient failures.
///
/// Delay computation is pure so the schedule can be tested without
/// sleeping: attempt `n` (zero-based) waits `base_delay * multiplier^n`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given zero-based attempt fails
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(self.multiplier.saturating_pow(attempt))
    }

    /// Run `op` until it succeeds or attempts are exhausted.
    ///
    /// The closure receives the zero-based attempt number. The final
    /// failure is returned as-is; no delay is inserted after it.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        E: std::fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(
                        label = %label,
                        attempt = attempt + 1,
                        max_attempts,
                        error = %e,
                        "Attempt failed"
                    );
                    if attempt + 1 >= max_attempts {
                        return Err(e);
                    }
                    tokio::time::sleep(self.delay_for(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn delay_doubles_each_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_without_retry() {
        let policy = RetryPolicy::default();
        let result: Result<u32, String> = policy.run("test", |_| async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<u32, String> = policy
            .run("test", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err("transient".to_string())
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_last_error_after_exhaustion() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            multiplier: 2,
        };

        let result: Result<u32, String> = policy
            .run("test", |attempt| async move { Err(format!("boom {attempt}")) })
            .await;

        assert_eq!(result.unwrap_err(), "boom 2");
    }
}
