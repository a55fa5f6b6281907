//! Retry loop: run an async operation until success or the policy says stop.

use std::future::Future;

use super::classify;
use super::error::{RemoteError, RetryError};
use super::policy::{ErrorKind, RetryDecision, RetryPolicy};

/// Runs `op` with the default 1s backoff and `max_attempts` attempts.
pub async fn with_retry<T, F, Fut>(context: &str, max_attempts: u32, op: F) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    run_with_retry(&RetryPolicy::with_max_attempts(max_attempts), context, op).await
}

/// Runs `op` until it succeeds or the retry policy says to stop.
///
/// On a retryable failure (429, 5xx) the current task sleeps for the backoff
/// duration with `tokio::time::sleep`, so other tasks keep running. Note that
/// the sleep also happens after the final attempt before giving up.
/// A `max_attempts` of 0 is treated as 1.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    context: &str,
    mut op: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 0..max_attempts {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        let kind = classify::classify(&err);
        match policy.decide(attempt, kind) {
            RetryDecision::NoRetry => return Err(permanent(kind, context, err)),
            RetryDecision::RetryAfter(delay) => {
                tracing::warn!(
                    context,
                    status = ?err.status,
                    "{}: {} - retrying in {}ms (attempt {}/{})",
                    context,
                    err,
                    delay.as_millis(),
                    attempt + 1,
                    max_attempts
                );
                tokio::time::sleep(delay).await;
                last_error = Some(err);
            }
        }
    }

    Err(RetryError::RetriesExhausted {
        context: context.to_string(),
        attempts: max_attempts,
        last: last_error.unwrap_or_else(|| RemoteError::other("no attempt was made")),
    })
}

fn permanent(kind: ErrorKind, context: &str, error: RemoteError) -> RetryError {
    match kind {
        ErrorKind::NotFound => RetryError::NotFound {
            context: context.to_string(),
            error,
        },
        ErrorKind::InvalidRequest => RetryError::InvalidRequest {
            context: context.to_string(),
            error,
        },
        _ => RetryError::Unclassified(error),
    }
}
