//! Service-registration metadata merging.
//!
//! Multiple bundled dependencies may each carry a registration file for
//! the same service interface under `META-INF/services/`. Those are
//! unioned line-wise into a single entry instead of letting one archive
//! silently overwrite another. Any other duplicated path keeps the first
//! occurrence.

use std::collections::HashMap;

use crate::shade::archive::Entry;

/// Prefix of service-registration entries.
pub const SERVICES_PREFIX: &str = "META-INF/services/";

/// Collapse duplicate entry paths: service files are unioned, everything
/// else is first-wins. First-seen path order is preserved.
pub fn merge_entries(entries: Vec<Entry>) -> Vec<Entry> {
    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, Entry> = HashMap::new();

    for entry in entries {
        match merged.get_mut(&entry.path) {
            None => {
                order.push(entry.path.clone());
                merged.insert(entry.path.clone(), entry);
            }
            Some(existing) if entry.path.starts_with(SERVICES_PREFIX) => {
                existing.data = union_lines(&existing.data, &entry.data);
            }
            Some(_) => {
                tracing::debug!("duplicate entry `{}`: keeping first occurrence", entry.path);
            }
        }
    }

    order
        .into_iter()
        .map(|path| merged.remove(&path).expect("entry recorded in order"))
        .collect()
}

/// Union two service files line-wise, preserving first-seen order and
/// dropping duplicates and blank lines.
fn union_lines(first: &[u8], second: &[u8]) -> Vec<u8> {
    let mut seen: Vec<String> = Vec::new();

    for data in [first, second] {
        let text = String::from_utf8_lossy(data);
        for line in text.lines() {
            let line = line.trim();
            if !line.is_empty() && !seen.iter().any(|s| s == line) {
                seen.push(line.to_string());
            }
        }
    }

    let mut out = seen.join("\n");
    out.push('\n');
    out.into_bytes()
}
