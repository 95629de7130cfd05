//! Namespace relocation.
//!
//! Bundled libraries are moved under a private namespace prefix so the
//! embedded copy cannot collide with another plugin's copy of the same
//! library loaded into the same host process. Both the slash form used
//! by entry paths and internal names (`org/incendo/...`) and the dot
//! form used by textual references (`org.incendo....`) are rewritten.
//!
//! Relocation is idempotent: occurrences that are already part of the
//! target namespace are masked before the source namespace is replaced,
//! so applying the same table twice changes nothing.

use crate::core::manifest::RelocationRule;

/// One compiled relocation rule.
#[derive(Debug, Clone)]
pub struct Relocation {
    /// Source prefix, dot form
    from: String,

    /// Target prefix, dot form
    to: String,

    /// Source prefix, slash form
    from_path: String,

    /// Target prefix, slash form
    to_path: String,
}

impl Relocation {
    /// Compile a rule into both namespace forms.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        let to = to.into();
        let from_path = from.replace('.', "/");
        let to_path = to.replace('.', "/");
        Relocation {
            from,
            to,
            from_path,
            to_path,
        }
    }

    /// Source namespace (dot form).
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Target namespace (dot form).
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Relocate an entry path, if this rule applies.
    ///
    /// Returns `None` both when the rule does not match and when the path
    /// already lives under the target prefix.
    pub fn relocate_path(&self, path: &str) -> Option<String> {
        let target_prefix = format!("{}/", self.to_path);
        if path.starts_with(&target_prefix) {
            return None;
        }

        let source_prefix = format!("{}/", self.from_path);
        path.strip_prefix(&source_prefix)
            .map(|rest| format!("{}{}", target_prefix, rest))
    }

    /// Rewrite all namespace references in a byte buffer.
    pub fn relocate_bytes(&self, data: &[u8]) -> Vec<u8> {
        let dot = replace_guarded(data, self.from.as_bytes(), self.to.as_bytes());
        replace_guarded(&dot, self.from_path.as_bytes(), self.to_path.as_bytes())
    }
}

impl From<&RelocationRule> for Relocation {
    fn from(rule: &RelocationRule) -> Self {
        Relocation::new(rule.from.clone(), rule.to.clone())
    }
}

/// Apply an ordered relocation table to an entry path.
///
/// The first matching rule wins; a table that matches nothing is a no-op.
pub fn relocate_entry_path(rules: &[Relocation], path: &str) -> String {
    for rule in rules {
        if let Some(relocated) = rule.relocate_path(path) {
            return relocated;
        }
    }
    path.to_string()
}

/// Apply an ordered relocation table to entry bytes.
pub fn relocate_entry_bytes(rules: &[Relocation], data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    for rule in rules {
        out = rule.relocate_bytes(&out);
    }
    out
}

/// Identifier characters that extend a namespace segment. A match followed
/// by one of these is a longer, different namespace, not a reference to
/// ours. Only the trailing side is checked: in the binary class format a
/// reference like `Lorg/incendo/cloud/X;` is preceded by arbitrary bytes
/// (tag and length prefixes), so a leading check would miss real
/// references.
fn is_ident(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

/// Find occurrences of `needle` in `data` that end on a segment boundary.
fn find_occurrences(data: &[u8], needle: &[u8]) -> Vec<usize> {
    if needle.is_empty() || data.len() < needle.len() {
        return Vec::new();
    }

    let mut positions = Vec::new();
    let mut i = 0;
    while i + needle.len() <= data.len() {
        if &data[i..i + needle.len()] == needle {
            let after = i + needle.len();
            if after == data.len() || !is_ident(data[after]) {
                positions.push(i);
                i += needle.len();
                continue;
            }
        }
        i += 1;
    }
    positions
}

/// Replace occurrences of `from` with `to`, skipping any occurrence that
/// sits inside an existing occurrence of `to`. This is what makes repeated
/// application a no-op.
fn replace_guarded(data: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    // Ranges already holding the target namespace are off limits.
    let masked: Vec<(usize, usize)> = find_occurrences(data, to)
        .into_iter()
        .map(|start| (start, start + to.len()))
        .collect();

    let is_masked = |start: usize, end: usize| {
        masked
            .iter()
            .any(|&(mask_start, mask_end)| start < mask_end && end > mask_start)
    };

    let mut out = Vec::with_capacity(data.len());
    let mut last = 0;
    for start in find_occurrences(data, from) {
        let end = start + from.len();
        if start < last || is_masked(start, end) {
            continue;
        }
        out.extend_from_slice(&data[last..start]);
        out.extend_from_slice(to);
        last = end;
    }
    out.extend_from_slice(&data[last..]);
    out
}
