//! Resource templating.
//!
//! Literal `${key}` substitution over project resource entries matching
//! the configured glob patterns. Substitution is verbatim string
//! replacement, not a templating language: a token configured but absent
//! from a file is a silent no-op, and re-running with the same token map
//! is idempotent.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use glob::Pattern;

use crate::shade::archive::{Entry, EntryOrigin};

/// Compiled resource-templating configuration.
pub struct Templater {
    patterns: Vec<Pattern>,
    tokens: BTreeMap<String, String>,
}

impl Templater {
    /// Compile glob patterns and capture the token map.
    pub fn new(patterns: &[String], tokens: BTreeMap<String, String>) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).with_context(|| format!("invalid resource pattern: {}", p))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Templater { patterns, tokens })
    }

    /// The token map applied to matching entries.
    pub fn tokens(&self) -> &BTreeMap<String, String> {
        &self.tokens
    }

    /// Whether an entry path matches any configured pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    /// Apply the token map to every matching project-origin entry.
    ///
    /// Bundled entries are never templated: their resource files belong
    /// to their libraries.
    pub fn apply(&self, entries: &mut [Entry]) {
        for entry in entries {
            if entry.origin != EntryOrigin::Project || !self.matches(&entry.path) {
                continue;
            }
            if let Some(templated) = self.apply_to_bytes(&entry.data) {
                tracing::debug!("templated resource `{}`", entry.path);
                entry.data = templated;
            }
        }
    }

    /// Substitute tokens in a buffer. Returns `None` when nothing changed
    /// (including non-UTF-8 content, which is left untouched).
    fn apply_to_bytes(&self, data: &[u8]) -> Option<Vec<u8>> {
        let text = std::str::from_utf8(data).ok()?;
        let templated = apply_tokens(text, &self.tokens);
        if templated.as_bytes() == data {
            None
        } else {
            Some(templated.into_bytes())
        }
    }
}

/// Replace each `${key}` placeholder with its token value.
pub fn apply_tokens(text: &str, tokens: &BTreeMap<String, String>) -> String {
    let mut result = text.to_string();
    for (key, value) in tokens {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("project.version".to_string(), "1.0-SNAPSHOT+abcdef1".to_string()),
            ("project.name".to_string(), "plotmines".to_string()),
        ])
    }

    #[test]
    fn test_apply_tokens() {
        let out = apply_tokens(
            "name: ${project.name}\nversion: ${project.version}\n",
            &tokens(),
        );
        assert_eq!(out, "name: plotmines\nversion: 1.0-SNAPSHOT+abcdef1\n");
    }

    #[test]
    fn test_missing_placeholder_is_noop() {
        let text = "nothing to substitute\n";
        assert_eq!(apply_tokens(text, &tokens()), text);
    }

    #[test]
    fn test_templating_is_idempotent() {
        let once = apply_tokens("version: ${project.version}\n", &tokens());
        let twice = apply_tokens(&once, &tokens());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_only_matching_project_entries_templated() {
        let templater =
            Templater::new(&["**/*.yml".to_string()], tokens()).unwrap();

        let mut entries = vec![
            Entry::project("config/mines.yml", b"v: ${project.version}\n".to_vec()),
            Entry::project("readme.txt", b"v: ${project.version}\n".to_vec()),
            Entry {
                path: "bundled.yml".to_string(),
                data: b"v: ${project.version}\n".to_vec(),
                origin: EntryOrigin::Bundled("a.b:c".to_string()),
            },
        ];

        templater.apply(&mut entries);

        assert_eq!(entries[0].data, b"v: 1.0-SNAPSHOT+abcdef1\n".to_vec());
        assert_eq!(entries[1].data, b"v: ${project.version}\n".to_vec());
        assert_eq!(entries[2].data, b"v: ${project.version}\n".to_vec());
    }

    #[test]
    fn test_top_level_yaml_matches_pattern() {
        let templater =
            Templater::new(&["**/*.yml".to_string(), "*.yml".to_string()], tokens()).unwrap();
        assert!(templater.matches("plugin.yml"));
        assert!(templater.matches("config/mines.yml"));
        assert!(!templater.matches("data.json"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = Templater::new(&["[".to_string()], tokens());
        assert!(result.is_err());
    }

    #[test]
    fn test_binary_content_untouched() {
        let templater = Templater::new(&["**/*.yml".to_string()], tokens()).unwrap();
        let data = vec![0xFF, 0xFE, 0x00, 0x01];
        let mut entries = vec![Entry::project("weird.yml", data.clone())];
        templater.apply(&mut entries);
        assert_eq!(entries[0].data, data);
    }
}
