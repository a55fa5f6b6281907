//! CLI for attachpack.

mod commands;

use anyhow::Result;
use attachpack_core::config;
use attachpack_core::retry::{RetryError, RetryErrorKind};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_auth, run_completions, run_fetch, run_search, FetchArgs};

/// Top-level CLI for attachpack.
#[derive(Debug, Parser)]
#[command(name = "attachpack")]
#[command(about = "attachpack: search Gmail and pack matching attachments into a ZIP", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Authorize read-only Gmail access and save the token.
    Auth {
        /// OAuth client secrets JSON downloaded from the Google Cloud console.
        #[arg(long, value_name = "PATH")]
        credentials: Option<PathBuf>,
    },

    /// List attachments of messages matching a Gmail query, without downloading.
    Search {
        /// Gmail search query, e.g. "has:attachment from:alice@example.com".
        query: String,
        /// Inspect at most N messages.
        #[arg(long, value_name = "N")]
        max: Option<usize>,
    },

    /// Download attachments of matching messages into a ZIP archive.
    Fetch {
        /// Gmail search query.
        query: String,
        /// Archive path (default: attachments-<unix-time>.zip in output_dir or the current directory).
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Inspect at most N messages.
        #[arg(long, value_name = "N")]
        max: Option<usize>,
        /// Only keep attachments with this extension (repeatable or comma-separated).
        #[arg(long, value_name = "EXT", value_delimiter = ',')]
        ext: Vec<String>,
        /// Replace the output file if it already exists.
        #[arg(long)]
        overwrite: bool,
    },

    /// Print a shell completion script to stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::Completions { shell } = cli.command {
            run_completions(shell);
            return Ok(());
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Auth { credentials } => run_auth(&cfg, credentials.as_deref()).await?,
            CliCommand::Search { query, max } => run_search(&cfg, &query, max).await?,
            CliCommand::Fetch {
                query,
                output,
                max,
                ext,
                overwrite,
            } => {
                let args = FetchArgs {
                    query,
                    output,
                    max,
                    extensions: ext,
                    overwrite,
                };
                run_fetch(&cfg, &args).await?;
            }
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

/// Process exit code for a failed run: 2 for a rejected request, 3 when
/// retries ran out, 1 for everything else.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<RetryError>().map(RetryError::kind) {
        Some(RetryErrorKind::InvalidRequest) => 2,
        Some(RetryErrorKind::RetriesExhausted) => 3,
        _ => 1,
    }
}

#[cfg(test)]
mod tests;
