//! Remote call failures and the errors produced by the retry loop.

/// A single failed remote call: optional HTTP status plus a readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    /// HTTP status, when the failure came from a response.
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Failure without a status code (transport, decoding, ...).
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

impl From<curl::Error> for RemoteError {
    fn from(e: curl::Error) -> Self {
        RemoteError::other(e.to_string())
    }
}

/// Coarse kind of a [`RetryError`], used by callers to pick an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryErrorKind {
    /// Permanent; skip the item and continue.
    NotFound,
    /// Permanent; abort and report.
    InvalidRequest,
    /// Retry budget spent on transient faults; abort and report.
    RetriesExhausted,
    /// Original error, passed through; treat as fatal.
    Unclassified,
}

/// Error returned by [`run_with_retry`](super::run_with_retry).
///
/// Every variant except `Unclassified` carries the caller's context string
/// in its message so the failing operation can be identified from the text.
#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    #[error("{context}: Resource not found (may have been deleted)")]
    NotFound { context: String, error: RemoteError },

    #[error("{context}: Invalid request - {}", .error.message)]
    InvalidRequest { context: String, error: RemoteError },

    #[error("{context}: Failed after {attempts} attempts - {}", .last.message)]
    RetriesExhausted {
        context: String,
        attempts: u32,
        last: RemoteError,
    },

    #[error(transparent)]
    Unclassified(RemoteError),
}

impl RetryError {
    pub fn kind(&self) -> RetryErrorKind {
        match self {
            RetryError::NotFound { .. } => RetryErrorKind::NotFound,
            RetryError::InvalidRequest { .. } => RetryErrorKind::InvalidRequest,
            RetryError::RetriesExhausted { .. } => RetryErrorKind::RetriesExhausted,
            RetryError::Unclassified(_) => RetryErrorKind::Unclassified,
        }
    }

    /// The remote failure behind this error (the last one, for exhausted retries).
    pub fn remote(&self) -> &RemoteError {
        match self {
            RetryError::NotFound { error, .. } | RetryError::InvalidRequest { error, .. } => error,
            RetryError::RetriesExhausted { last, .. } => last,
            RetryError::Unclassified(e) => e,
        }
    }
}
