//! `attachpack search` – list matching attachments without downloading them.

use anyhow::Result;
use attachpack_core::collect::list_attachments;
use attachpack_core::config::AttachpackConfig;

use super::session::{collect_options, connect};

pub async fn run_search(cfg: &AttachpackConfig, query: &str, max: Option<usize>) -> Result<()> {
    let (client, policy) = connect(cfg).await?;
    let options = collect_options(cfg, max, &[]);
    let (metas, report) = list_attachments(&client, &policy, query, &options, None).await?;

    if metas.is_empty() {
        println!("No attachments found.");
        return Ok(());
    }
    println!("{:<18} {:>10}  {}", "MESSAGE", "SIZE", "FILENAME");
    for m in &metas {
        let size_str = m
            .size
            .map(|s| format!("{s}"))
            .unwrap_or_else(|| "-".to_string());
        println!("{:<18} {:>10}  {}", m.message_id, size_str, m.filename);
    }
    println!(
        "\n{} attachment(s) in {} message(s)",
        metas.len(),
        report.messages_scanned
    );
    if report.messages_skipped > 0 {
        println!("{} message(s) no longer exist and were skipped", report.messages_skipped);
    }
    Ok(())
}
