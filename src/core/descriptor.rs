//! Plugin descriptor generation.
//!
//! The descriptor (`plugin.yml`) is the metadata file the host reads when
//! loading the artifact: entry point class, supported host API version,
//! authors, homepage, and soft dependencies. It is generated from the
//! `[plugin]` manifest section and stamped with the decorated version.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Path of the descriptor entry inside the artifact.
pub const DESCRIPTOR_PATH: &str = "plugin.yml";

/// The generated plugin descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Plugin name shown by the host
    pub name: String,

    /// Decorated version string
    pub version: String,

    /// Fully-qualified entry point class
    pub main: String,

    /// Supported host API version
    #[serde(rename = "api-version", skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub authors: Vec<String>,

    /// Plugins loaded before this one when present, without being required
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub softdepend: Vec<String>,
}

impl PluginDescriptor {
    /// Render the descriptor as YAML bytes for the artifact entry.
    pub fn render(&self) -> Result<Vec<u8>> {
        let yaml = serde_yaml::to_string(self).context("failed to render plugin descriptor")?;
        Ok(yaml.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> PluginDescriptor {
        PluginDescriptor {
            name: "plotmines".to_string(),
            version: "1.0-SNAPSHOT+abcdef1".to_string(),
            main: "com.lukemango.plotmines.PlotMines".to_string(),
            api_version: Some("1.20".to_string()),
            description: Some("PlotMines for PlotSquared".to_string()),
            website: Some("https://github.com/lukemango/mango-plotmines".to_string()),
            authors: vec!["lukemango".to_string()],
            softdepend: vec![
                "FastAsyncWorldEdit".to_string(),
                "PlotSquared".to_string(),
            ],
        }
    }

    #[test]
    fn test_render_contains_fields() {
        let yaml = String::from_utf8(descriptor().render().unwrap()).unwrap();
        assert!(yaml.contains("name: plotmines"));
        assert!(yaml.contains("version: 1.0-SNAPSHOT+abcdef1"));
        assert!(yaml.contains("main: com.lukemango.plotmines.PlotMines"));
        assert!(yaml.contains("api-version: '1.20'"));
        assert!(yaml.contains("- FastAsyncWorldEdit"));
    }

    #[test]
    fn test_render_omits_empty_fields() {
        let mut desc = descriptor();
        desc.api_version = None;
        desc.softdepend.clear();

        let yaml = String::from_utf8(desc.render().unwrap()).unwrap();
        assert!(!yaml.contains("api-version"));
        assert!(!yaml.contains("softdepend"));
    }

    #[test]
    fn test_round_trip() {
        let desc = descriptor();
        let yaml = desc.render().unwrap();
        let parsed: PluginDescriptor = serde_yaml::from_slice(&yaml).unwrap();
        assert_eq!(parsed, desc);
    }
}
