//! Filename collision resolution for archive entries.

use std::collections::{HashMap, HashSet};

/// One file destined for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedEntry {
    pub name: String,
    pub payload: Vec<u8>,
}

impl NamedEntry {
    pub fn new(name: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }
}

/// Gives every entry a unique name, keeping order and payloads.
///
/// The n-th repeat of a name gets `_n` inserted before its extension, where
/// the extension starts at the *last* dot: `archive.tar.gz` becomes
/// `archive.tar_1.gz`. A leading dot does not start an extension, so
/// `.gitignore` becomes `.gitignore_1`.
///
/// Counters are keyed by the original name. If a generated name is already
/// taken (e.g. a literal `a_1.txt` next to two `a.txt`), the counter keeps
/// going until the name is free.
pub fn deduplicate(entries: Vec<NamedEntry>) -> Vec<NamedEntry> {
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::with_capacity(entries.len());
    let mut out = Vec::with_capacity(entries.len());

    for entry in entries {
        let counter = counters.entry(entry.name.clone()).or_insert(0);
        let mut count = *counter;
        let mut name = numbered_name(&entry.name, count);
        while taken.contains(&name) {
            count += 1;
            name = numbered_name(&entry.name, count);
        }
        *counter = count + 1;
        taken.insert(name.clone());
        out.push(NamedEntry {
            name,
            payload: entry.payload,
        });
    }

    out
}

fn numbered_name(name: &str, count: usize) -> String {
    if count == 0 {
        return name.to_string();
    }
    let (stem, ext) = split_extension(name);
    format!("{stem}_{count}{ext}")
}

/// Splits at the last `.` when it is not the first character; `ext` keeps the dot.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    }
}
