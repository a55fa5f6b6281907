//! ZIP packing of downloaded attachments.
//!
//! [`build_archive`] deduplicates names and produces the whole container in
//! memory; [`write_archive`] puts the finished buffer on disk atomically.

mod dedup;
mod output;

pub use dedup::{deduplicate, NamedEntry};
pub use output::{write_archive, WrittenArchive};

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Deflate level used for every entry.
pub const COMPRESSION_LEVEL: i64 = 6;

/// Failure while assembling the archive. Not expected for any well-formed
/// entry list; propagated as-is when it happens.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("archive I/O: {0}")]
    Io(#[from] std::io::Error),
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL))
}

/// Packs `entries` into a ZIP container and returns its bytes.
///
/// Names are deduplicated here; callers pass the raw list. An empty list
/// yields a valid archive with zero entries.
pub fn build_archive(entries: Vec<NamedEntry>) -> Result<Vec<u8>, ArchiveError> {
    let entries = deduplicate(entries);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for entry in &entries {
        zip.start_file(entry.name.as_str(), entry_options())?;
        zip.write_all(&entry.payload)?;
    }
    let cursor = zip.finish()?;
    tracing::debug!(entries = entries.len(), "archive built");
    Ok(cursor.into_inner())
}
