//! bounded retry around a single `Embedder::embed` call
//!
//! only transient failures (rate limit, connection, timeout) are retried.
//! the delay before attempt `n` (n >= 2) is `min(max_delay, base_delay * 2^(n-2))`,
//! so the defaults wait 1s before the second attempt and 2s before the third.
//! the policy is plain data: it holds no state shared between calls, and a
//! backoff sleep only parks the calling task.

use crate::providers::{Embedder, Embedding, EmbeddingError};
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// total attempts, including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// delay to wait before the 1-based `attempt`; zero for the first attempt
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt < 2 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 2).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// run `embedder.embed(text)` until it succeeds, fails fatally, or the
    /// attempt budget runs out. the last error is returned as-is; there is no
    /// fallback vector at this layer.
    pub async fn run<E: Embedder>(&self, embedder: &E, text: &str) -> Result<Embedding, EmbeddingError> {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match embedder.embed(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    attempt += 1;
                    let delay = self.delay_before(attempt);
                    let error = err.to_string();
                    logfire::warn!(
                        "retrying embedding after transient failure",
                        provider = embedder.name(),
                        next_attempt = attempt as i64,
                        delay_ms = delay.as_millis() as i64,
                        error = &error
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
