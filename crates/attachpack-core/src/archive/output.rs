//! Atomic write of a finished archive buffer.

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::checksum;

/// What ended up on disk.
#[derive(Debug, Clone)]
pub struct WrittenArchive {
    pub path: PathBuf,
    pub size: u64,
    /// Lowercase hex SHA-256 of the file.
    pub sha256: String,
}

/// Writes `bytes` to `path` via a temp file in the same directory, then renames.
///
/// The temp file is created owner-only (0600 on Unix), so the archive never
/// appears world-readable, even briefly. Fails if `path` exists and
/// `overwrite` is false. The file is re-read and its digest compared with the
/// buffer before returning.
pub fn write_archive(path: &Path, bytes: &[u8], overwrite: bool) -> Result<WrittenArchive> {
    if path.exists() && !overwrite {
        bail!(
            "{} already exists; pass --overwrite to replace it",
            path.display()
        );
    }
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".attachpack-")
        .suffix(".part")
        .tempfile_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    tmp.write_all(bytes).context("write archive")?;
    tmp.as_file().sync_all().context("sync archive")?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("rename archive into {}", path.display()))?;

    let sha256 = checksum::sha256_path(path)?;
    if sha256 != checksum::sha256_bytes(bytes) {
        bail!("{} does not match the archive that was built", path.display());
    }
    tracing::info!(path = %path.display(), size = bytes.len(), %sha256, "archive written");

    Ok(WrittenArchive {
        path: path.to_path_buf(),
        size: bytes.len() as u64,
        sha256,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_reports_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.zip");
        let written = write_archive(&path, b"PK-data", false).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"PK-data");
        assert_eq!(written.size, 7);
        assert_eq!(written.sha256, checksum::sha256_bytes(b"PK-data"));
        // no temp files left behind
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn refuses_to_overwrite_unless_asked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.zip");
        std::fs::write(&path, b"old").unwrap();
        let err = write_archive(&path, b"new", false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read(&path).unwrap(), b"old");

        write_archive(&path, b"new", true).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/out.zip");
        write_archive(&path, b"x", false).unwrap();
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn archive_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.zip");
        write_archive(&path, b"x", false).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
