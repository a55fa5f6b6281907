//! Retry and backoff policy for remote calls.
//!
//! Every outbound API call goes through [`run_with_retry`]. Failures are
//! classified by status code: 404 and 400 are permanent and surface at once,
//! 429 and 5xx are transient and retried with exponential backoff, anything
//! else is handed back to the caller untouched.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_status};
pub use error::{RemoteError, RetryError, RetryErrorKind};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, with_retry};
