//! Classify remote status codes into retry policy error kinds.

use super::error::RemoteError;
use super::policy::ErrorKind;

/// Classify an optional HTTP status code for retry decisions.
pub fn classify_status(status: Option<u16>) -> ErrorKind {
    match status {
        Some(404) => ErrorKind::NotFound,
        Some(400) => ErrorKind::InvalidRequest,
        Some(429) => ErrorKind::Throttled,
        Some(code) if code >= 500 => ErrorKind::Http5xx(code),
        _ => ErrorKind::Other,
    }
}

/// Classify a failed remote call.
pub fn classify(e: &RemoteError) -> ErrorKind {
    classify_status(e.status)
}
