use crate::error::{ErrorKind, Result};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Exponential backoff for transient failures.
///
/// The first attempt is followed by up to `max_retries` more. Attempt `n`
/// (zero based) that fails transiently is followed by a pause of
/// `base_delay * 2^n`, capped at `max_delay`. Failures that aren't
/// [retryable](ErrorKind::is_retryable) are returned immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}
impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}
impl RetryPolicy {
    /// Pause after the given failed attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.checked_mul(factor).unwrap_or(self.max_delay).min(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails terminally, or runs out of
    /// retries. The operation is given the zero-based attempt number.
    ///
    /// Exhaustion is reported as [`ErrorKind::RetriesExhausted`] wrapping the
    /// last failure.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            let error = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if !error.is_retryable() => return Err(error),
                Err(error) => error,
            };
            if attempt >= self.max_retries {
                let attempts = attempt + 1;
                return Err(error.raise(ErrorKind::RetriesExhausted { attempts }));
            }
            let delay = self.delay(attempt);
            warn!(attempt, ?delay, reason = %*error, "retrying after transient failure");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{TerminalReason, TransientReason};
    use sge_extract::models::TitleId;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn transient() -> crate::error::Error {
        exn::Exn::from(ErrorKind::Transient(TransientReason::Status(503)))
    }

    #[test]
    fn test_delays() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        };
        let delays: Vec<_> = (0..5).map(|n| policy.delay(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 5, 5]);
        assert_eq!(policy.delay(200), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let result = RetryPolicy::default()
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { if attempt < 2 { Err(transient()) } else { Ok(attempt) } }
            })
            .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s then 2s of backoff.
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = RetryPolicy::default()
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(transient()) }
            })
            .await;
        let error = result.unwrap_err();
        assert!(matches!(&*error, ErrorKind::RetriesExhausted { attempts: 3 }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_failures_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = RetryPolicy::default()
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    exn::bail!(ErrorKind::NotAccessible {
                        title_id: TitleId::new(1),
                        reason: TerminalReason::Status(403),
                    })
                }
            })
            .await;
        assert!(matches!(&*result.unwrap_err(), ErrorKind::NotAccessible { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
