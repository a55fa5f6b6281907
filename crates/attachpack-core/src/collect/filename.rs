//! Make attachment filenames safe to use as archive paths.

const FALLBACK_NAME: &str = "attachment";

/// Replaces path separators, NUL and control characters with `_`, trims
/// surrounding whitespace, and turns names that would escape or be empty
/// (`""`, `.`, `..`) into `attachment`. Spaces and Unicode are kept.
pub fn safe_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == '\0' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// True if `filename` ends in one of `extensions` (case-insensitive, no dot).
/// An empty list matches everything.
pub fn matches_extension(filename: &str, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    let lower = filename.to_lowercase();
    extensions.iter().any(|ext| {
        let ext = ext.trim_start_matches('.').to_lowercase();
        lower
            .strip_suffix(ext.as_str())
            .map_or(false, |rest| rest.ends_with('.'))
    })
}
