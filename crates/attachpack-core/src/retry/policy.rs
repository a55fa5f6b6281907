use std::time::Duration;

use crate::config::RetryConfig;

/// Classification of a remote failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 404: the resource is gone.
    NotFound,
    /// 400: the request itself is malformed.
    InvalidRequest,
    /// 429: server asked us to slow down.
    Throttled,
    /// Any 5xx status.
    Http5xx(u16),
    /// Any other status, or no status at all.
    Other,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Throttled | ErrorKind::Http5xx(_))
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Bounded exponential backoff: `base_delay * 2^attempt`, uncapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles with each attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts,
            base_delay: Duration::from_millis(cfg.base_delay_ms),
        }
    }

    /// Backoff after the failed attempt with 0-based index `attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Decide what to do after attempt `attempt` (0-based) failed with `kind`.
    ///
    /// The attempt budget is enforced by the retry loop, not here: a retryable
    /// failure always yields a delay, including after the last attempt.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if kind.is_retryable() {
            RetryDecision::RetryAfter(self.backoff(attempt))
        } else {
            RetryDecision::NoRetry
        }
    }
}
