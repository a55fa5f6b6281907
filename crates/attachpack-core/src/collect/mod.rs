//! Search → attachment metadata → download, with every remote call retried.
//!
//! `NotFound` (a message or attachment deleted between listing and fetching)
//! skips that item and continues. Every other failure aborts the run.

mod filename;
mod source;

pub use filename::{matches_extension, safe_filename};
pub use source::MailSource;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::archive::NamedEntry;
use crate::gmail::{attachments_of, decode_body_data, AttachmentMeta};
use crate::retry::{run_with_retry, RetryError, RetryErrorKind, RetryPolicy};

/// Knobs for one collection run.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Stop after this many messages (None = all matches).
    pub max_messages: Option<usize>,
    /// Only keep attachments with these extensions (empty = all).
    pub extensions: Vec<String>,
    pub page_size: u32,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            max_messages: None,
            extensions: Vec::new(),
            page_size: 100,
        }
    }
}

/// Progress notifications, for the CLI to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Search finished with this many messages.
    Found { messages: usize },
    /// Message `index` (1-based) of `total` is being inspected.
    Message { index: usize, total: usize },
    Downloaded { filename: String, bytes: usize },
    Skipped { what: String, reason: String },
}

/// Counts for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub messages_scanned: usize,
    pub messages_skipped: usize,
    pub attachments_found: usize,
    pub attachments_downloaded: usize,
    pub attachments_skipped: usize,
    pub total_bytes: u64,
}

#[derive(Debug)]
pub struct Collected {
    pub entries: Vec<NamedEntry>,
    pub report: RunReport,
}

async fn notify(progress: Option<&mpsc::Sender<ProgressEvent>>, event: ProgressEvent) {
    if let Some(tx) = progress {
        // receiver gone means nobody is printing; keep going
        let _ = tx.send(event).await;
    }
}

/// Ids of messages matching `query`, following `nextPageToken` until done or
/// `limit` ids are collected.
pub async fn search<S: MailSource>(
    source: &S,
    policy: &RetryPolicy,
    query: &str,
    limit: Option<usize>,
    page_size: u32,
) -> Result<Vec<String>, RetryError> {
    let mut ids = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let token = page_token.as_deref();
        let page = run_with_retry(policy, "Searching messages", move || {
            source.list_messages(query, token, page_size)
        })
        .await?;
        ids.extend(page.messages.into_iter().map(|m| m.id));
        if let Some(limit) = limit {
            if ids.len() >= limit {
                ids.truncate(limit);
                break;
            }
        }
        match page.next_page_token {
            Some(next) if !next.is_empty() => page_token = Some(next),
            _ => break,
        }
    }
    tracing::info!(query, found = ids.len(), "search complete");
    Ok(ids)
}

/// Attachment metadata for every message matching `query`, without downloading.
pub async fn list_attachments<S: MailSource>(
    source: &S,
    policy: &RetryPolicy,
    query: &str,
    options: &CollectOptions,
    progress: Option<&mpsc::Sender<ProgressEvent>>,
) -> Result<(Vec<AttachmentMeta>, RunReport)> {
    let ids = search(source, policy, query, options.max_messages, options.page_size).await?;
    notify(progress, ProgressEvent::Found { messages: ids.len() }).await;

    let mut report = RunReport::default();
    let mut metas = Vec::new();
    let total = ids.len();
    for (i, id) in ids.iter().enumerate() {
        notify(progress, ProgressEvent::Message { index: i + 1, total }).await;
        let context = format!("Fetching message {id}");
        let message = match run_with_retry(policy, &context, || source.get_message(id)).await {
            Ok(m) => m,
            Err(e) if e.kind() == RetryErrorKind::NotFound => {
                tracing::warn!("{e}; skipping");
                report.messages_skipped += 1;
                notify(
                    progress,
                    ProgressEvent::Skipped {
                        what: format!("message {id}"),
                        reason: "not found".to_string(),
                    },
                )
                .await;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        report.messages_scanned += 1;
        metas.extend(
            attachments_of(&message)
                .into_iter()
                .filter(|a| matches_extension(&a.filename, &options.extensions)),
        );
    }
    report.attachments_found = metas.len();
    Ok((metas, report))
}

/// Full run: list attachments, download each, and return archive entries.
pub async fn collect_attachments<S: MailSource>(
    source: &S,
    policy: &RetryPolicy,
    query: &str,
    options: &CollectOptions,
    progress: Option<&mpsc::Sender<ProgressEvent>>,
) -> Result<Collected> {
    let (metas, mut report) = list_attachments(source, policy, query, options, progress).await?;

    let mut entries = Vec::with_capacity(metas.len());
    for meta in &metas {
        let payload = match download(source, policy, meta).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let skip_reason = match e.downcast_ref::<RetryError>().map(RetryError::kind) {
                    Some(RetryErrorKind::NotFound) => "not found",
                    _ => return Err(e),
                };
                tracing::warn!("{e:#}; skipping");
                report.attachments_skipped += 1;
                notify(
                    progress,
                    ProgressEvent::Skipped {
                        what: meta.filename.clone(),
                        reason: skip_reason.to_string(),
                    },
                )
                .await;
                continue;
            }
        };
        report.attachments_downloaded += 1;
        report.total_bytes += payload.len() as u64;
        notify(
            progress,
            ProgressEvent::Downloaded {
                filename: meta.filename.clone(),
                bytes: payload.len(),
            },
        )
        .await;
        entries.push(NamedEntry::new(safe_filename(&meta.filename), payload));
    }

    tracing::info!(
        downloaded = report.attachments_downloaded,
        skipped = report.attachments_skipped,
        bytes = report.total_bytes,
        "collection complete"
    );
    Ok(Collected { entries, report })
}

async fn download<S: MailSource>(
    source: &S,
    policy: &RetryPolicy,
    meta: &AttachmentMeta,
) -> Result<Vec<u8>> {
    if let Some(attachment_id) = meta.attachment_id.as_deref() {
        let context = format!("Downloading attachment {}", meta.filename);
        let bytes = run_with_retry(policy, &context, || {
            source.get_attachment(&meta.message_id, attachment_id)
        })
        .await?;
        return Ok(bytes);
    }
    let data = meta.inline_data.as_deref().unwrap_or("");
    decode_body_data(data)
        .with_context(|| format!("decode inline attachment {}", meta.filename))
}
