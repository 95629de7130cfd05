//! Configuration file support.
//!
//! Two locations are read and merged, project over global:
//! - Global: `~/.stevedore/config.toml` - user-wide defaults
//! - Project: `.stevedore/config.toml` - project-specific overrides

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Stevedore configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Assembly settings
    pub build: BuildSettings,

    /// Network settings
    pub net: NetConfig,
}

/// Assembly-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Override the manifest's output directory
    pub output_dir: Option<PathBuf>,

    /// Always skip minimization
    #[serde(default)]
    pub no_minimize: bool,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Offline mode (never fetch remote archives)
    #[serde(default)]
    pub offline: bool,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.output_dir.is_some() {
            self.build.output_dir = other.build.output_dir;
        }
        if other.build.no_minimize {
            self.build.no_minimize = true;
        }
        if other.net.offline {
            self.net.offline = true;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.stevedore/config.toml)
/// 2. Global config (~/.stevedore/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.build.output_dir.is_none());
        assert!(!config.build.no_minimize);
        assert!(!config.net.offline);
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[build]
output_dir = "./out"
no_minimize = true

[net]
offline = true
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.build.output_dir, Some(PathBuf::from("./out")));
        assert!(config.build.no_minimize);
        assert!(config.net.offline);
    }

    #[test]
    fn test_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");

        std::fs::write(&global, "[build]\noutput_dir = \"global-out\"\n").unwrap();
        std::fs::write(&project, "[build]\noutput_dir = \"project-out\"\n[net]\noffline = true\n")
            .unwrap();

        let config = load_config(&global, &project);
        assert_eq!(config.build.output_dir, Some(PathBuf::from("project-out")));
        assert!(config.net.offline);
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("none"), &tmp.path().join("none2"));
        assert!(config.build.output_dir.is_none());
    }
}
