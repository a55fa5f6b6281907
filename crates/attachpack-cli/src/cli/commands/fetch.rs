//! `attachpack fetch` – search, download every attachment, write one ZIP.

use anyhow::{bail, Result};
use attachpack_core::archive::{build_archive, write_archive};
use attachpack_core::auth::unix_now;
use attachpack_core::collect::{collect_attachments, ProgressEvent};
use attachpack_core::config::AttachpackConfig;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use super::session::{collect_options, connect};

#[derive(Debug, Clone)]
pub struct FetchArgs {
    pub query: String,
    pub output: Option<PathBuf>,
    pub max: Option<usize>,
    pub extensions: Vec<String>,
    pub overwrite: bool,
}

/// `attachments-<unix-ts>.zip` in `dir`, or in the current directory.
fn default_output(dir: Option<&Path>, now: u64) -> Result<PathBuf> {
    let name = format!("attachments-{now}.zip");
    match dir {
        Some(d) => Ok(d.join(name)),
        None => Ok(std::env::current_dir()?.join(name)),
    }
}

fn describe(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::Found { messages } => format!("Found {messages} matching message(s)"),
        ProgressEvent::Message { index, total } => format!("[{index}/{total}] reading message"),
        ProgressEvent::Downloaded { filename, bytes } => format!("  + {filename} ({bytes} bytes)"),
        ProgressEvent::Skipped { what, reason } => format!("  - skipped {what}: {reason}"),
    }
}

async fn print_progress(mut rx: mpsc::Receiver<ProgressEvent>) {
    while let Some(event) = rx.recv().await {
        println!("{}", describe(&event));
    }
}

pub async fn run_fetch(cfg: &AttachpackConfig, args: &FetchArgs) -> Result<()> {
    let path = match &args.output {
        Some(p) => p.clone(),
        None => default_output(cfg.output_dir.as_deref(), unix_now())?,
    };
    // Fail before downloading anything.
    if path.exists() && !args.overwrite {
        bail!(
            "{} already exists; pass --overwrite to replace it",
            path.display()
        );
    }

    let (client, policy) = connect(cfg).await?;
    let options = collect_options(cfg, args.max, &args.extensions);

    let (tx, rx) = mpsc::channel(64);
    let printer = tokio::spawn(print_progress(rx));
    let result = collect_attachments(&client, &policy, &args.query, &options, Some(&tx)).await;
    drop(tx);
    let _ = printer.await;
    let collected = result?;

    if collected.entries.is_empty() {
        println!("No attachments found.");
        return Ok(());
    }

    let count = collected.entries.len();
    let report = collected.report;
    let bytes = build_archive(collected.entries)?;
    let written = write_archive(&path, &bytes, args.overwrite)?;
    tracing::info!(
        path = %written.path.display(),
        files = count,
        size = written.size,
        "archive written"
    );

    println!(
        "Wrote {} ({} file(s), {} bytes)",
        written.path.display(),
        count,
        written.size
    );
    if report.attachments_skipped + report.messages_skipped > 0 {
        println!(
            "Skipped {} message(s) and {} attachment(s) that no longer exist",
            report.messages_skipped, report.attachments_skipped
        );
    }
    println!("sha256: {}", written.sha256);
    Ok(())
}
