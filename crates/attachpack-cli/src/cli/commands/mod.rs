//! CLI command handlers, one file per command.

mod auth;
mod completions;
mod fetch;
mod search;
mod session;

pub use auth::run_auth;
pub use completions::run_completions;
pub use fetch::{run_fetch, FetchArgs};
pub use search::run_search;
