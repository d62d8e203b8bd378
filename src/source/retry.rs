use crate::config::{BackoffGrowth, ReliabilityConfig};
use crate::error::SourceError;
use std::future::Future;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;

const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Bounded retry for source operations. Only `SourceError::Unavailable` is
/// retried; corruption and cancellation return immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    base: Duration,
    growth: BackoffGrowth,
}

impl RetryPolicy {
    pub fn new(attempts: u32, base: Duration, growth: BackoffGrowth) -> Self {
        Self {
            attempts: attempts.max(1),
            base,
            growth,
        }
    }

    pub fn from_config(config: &ReliabilityConfig) -> Self {
        Self::new(
            config.sync_attempts,
            Duration::from_secs(config.sync_backoff_base_secs),
            config.sync_backoff_growth,
        )
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let step = attempt.max(1);
        let delay = match self.growth {
            BackoffGrowth::Linear => self.base.saturating_mul(step),
            BackoffGrowth::Exponential => self
                .base
                .saturating_mul(2u32.saturating_pow(step.saturating_sub(1))),
        };
        delay.min(MAX_BACKOFF)
    }

    pub async fn run<T, F, Fut>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        mut attempt_op: F,
    ) -> Result<T, SourceError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let mut attempt = 1;
        loop {
            match attempt_op(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < self.attempts => {
                    let delay = self.delay_after(attempt);
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts = self.attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        %error,
                        "source operation failed, retrying"
                    );
                    tokio::select! {
                        () = cancel.cancelled() => return Err(SourceError::Cancelled),
                        () = time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
