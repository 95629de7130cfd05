//! Stevedore.toml manifest parsing and schema.
//!
//! The manifest is the declarative configuration for one plugin project:
//! package metadata, the plugin descriptor fields, build inputs, the
//! dependency declarations, the relocation table, and resource tokens.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::core::coordinate::Coordinate;
use crate::core::dependency::{DependencyDecl, DependencySpec};
use crate::core::descriptor::PluginDescriptor;

/// Canonical manifest file name.
pub const MANIFEST_FILE: &str = "Stevedore.toml";

/// Namespace syntax for relocation sources and targets.
static NAMESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z0-9_$]+)*$").expect("valid regex")
});

/// Errors locating the manifest file.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find `{MANIFEST_FILE}` in `{dir}` or any parent directory")]
    NotFound { dir: PathBuf },
}

/// The parsed Stevedore.toml manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Package metadata
    pub package: PackageMetadata,

    /// Plugin descriptor fields (None: no descriptor is generated)
    pub plugin: Option<PluginConfig>,

    /// Build inputs and output layout
    pub build: BuildConfig,

    /// Shading configuration
    pub shade: ShadeConfig,

    /// Resource templating configuration
    pub resources: ResourceConfig,

    /// Dependency declarations, keyed by coordinate
    pub dependencies: Vec<DependencyDecl>,

    /// The directory containing this manifest
    pub manifest_dir: PathBuf,
}

/// Package metadata from the [package] section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Project identifier; names the output artifact
    pub name: String,

    /// Base version string; `-SNAPSHOT` marks a pre-release
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub website: Option<String>,
}

/// Plugin descriptor fields from the [plugin] section.
///
/// Authors and website fall back to the [package] values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Fully-qualified entry point class
    pub main: String,

    /// Supported host API version
    #[serde(default)]
    pub api_version: Option<String>,

    /// Plugins loaded before this one when present
    #[serde(default)]
    pub softdepend: Vec<String>,

    /// Override the package authors list
    #[serde(default)]
    pub authors: Option<Vec<String>>,

    /// Override the package website
    #[serde(default)]
    pub website: Option<String>,
}

/// Build inputs and output layout from the [build] section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory holding the project's own compiled class tree
    pub classes: PathBuf,

    /// Directory holding the project's resource files (optional)
    pub resources: Option<PathBuf>,

    /// Directory searched for bundled dependency archives
    pub lib_dir: PathBuf,

    /// Directory the artifact is written to
    pub output_dir: PathBuf,

    /// Archive extension of inputs and the output artifact
    pub extension: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            classes: PathBuf::from("build/classes"),
            resources: None,
            lib_dir: PathBuf::from("libs"),
            output_dir: PathBuf::from("dist"),
            extension: "jar".to_string(),
        }
    }
}

/// An explicit relocation rule: rewrite `from` to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationRule {
    /// Source namespace prefix
    pub from: String,

    /// Target namespace prefix
    pub to: String,
}

/// Shading configuration from the [shade] section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadeConfig {
    /// Drop bundled classes unreachable from the project's own code
    pub minimize: bool,

    /// Target prefix for the `relocate` shorthand
    pub relocation_base: Option<String>,

    /// Shorthand: each namespace relocates to `{relocation_base}.{namespace}`
    pub relocate: Vec<String>,

    /// Explicit ordered rules, applied after the shorthand expansions
    pub rules: Vec<RelocationRule>,
}

impl Default for ShadeConfig {
    fn default() -> Self {
        ShadeConfig {
            minimize: true,
            relocation_base: None,
            relocate: Vec::new(),
            rules: Vec::new(),
        }
    }
}

impl ShadeConfig {
    /// The full ordered relocation table: shorthand expansions first,
    /// then explicit rules, in declaration order.
    pub fn relocation_table(&self) -> Result<Vec<RelocationRule>> {
        let mut table = Vec::with_capacity(self.relocate.len() + self.rules.len());

        if !self.relocate.is_empty() {
            let base = self.relocation_base.as_deref().ok_or_else(|| {
                anyhow::anyhow!(
                    "[shade] `relocate` requires `relocation_base` to be set"
                )
            })?;
            for source in &self.relocate {
                table.push(RelocationRule {
                    from: source.clone(),
                    to: format!("{}.{}", base, source),
                });
            }
        }

        table.extend(self.rules.iter().cloned());
        Ok(table)
    }
}

/// Resource templating configuration from the [resources] section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Glob patterns of entries to template
    pub patterns: Vec<String>,

    /// User tokens, merged over the built-ins
    pub tokens: BTreeMap<String, String>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        ResourceConfig {
            patterns: vec!["**/*.yml".to_string(), "*.yml".to_string()],
            tokens: BTreeMap::new(),
        }
    }
}

/// Raw manifest as deserialized from TOML.
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    package: Option<PackageMetadata>,

    #[serde(default)]
    plugin: Option<PluginConfig>,

    #[serde(default)]
    build: BuildConfig,

    #[serde(default)]
    shade: ShadeConfig,

    #[serde(default)]
    resources: ResourceConfig,

    #[serde(default)]
    dependencies: HashMap<String, DependencySpec>,
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawManifest =
            toml::from_str(content).with_context(|| "failed to parse Stevedore.toml")?;

        let manifest_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let Some(package) = raw.package else {
            bail!(
                "manifest at {} must have a [package] section",
                path.display()
            );
        };

        if package.name.is_empty() {
            bail!("[package] name must not be empty");
        }
        if package.version.is_empty() {
            bail!("[package] version must not be empty");
        }
        if let Some(ref website) = package.website {
            Url::parse(website)
                .with_context(|| format!("[package] website is not a valid URL: {}", website))?;
        }

        // Convert and validate dependency declarations
        let mut dependencies = Vec::with_capacity(raw.dependencies.len());
        for (key, spec) in &raw.dependencies {
            let coordinate: Coordinate = key
                .parse()
                .with_context(|| format!("invalid dependency coordinate `{}`", key))?;
            dependencies.push(DependencyDecl::from_spec(coordinate, spec));
        }
        dependencies.sort_by(|a, b| a.coordinate.cmp(&b.coordinate));

        // Validate the relocation table eagerly so a bad namespace fails
        // at parse time, not mid-assembly.
        let table = raw.shade.relocation_table()?;
        for rule in &table {
            for (part, value) in [("source", &rule.from), ("target", &rule.to)] {
                if !NAMESPACE_RE.is_match(value) {
                    bail!("[shade] invalid {} namespace: `{}`", part, value);
                }
            }
        }

        Ok(Manifest {
            package,
            plugin: raw.plugin,
            build: raw.build,
            shade: raw.shade,
            resources: raw.resources,
            dependencies,
            manifest_dir,
        })
    }

    /// Get the project name.
    pub fn name(&self) -> &str {
        &self.package.name
    }

    /// Get the base (undecorated) version string.
    pub fn base_version(&self) -> &str {
        &self.package.version
    }

    /// Output artifact file name for a decorated version.
    pub fn artifact_file_name(&self, decorated_version: &str) -> String {
        format!(
            "{}-{}.{}",
            self.package.name, decorated_version, self.build.extension
        )
    }

    /// Build the plugin descriptor for a decorated version, if a [plugin]
    /// section is present.
    pub fn descriptor(&self, decorated_version: &str) -> Option<PluginDescriptor> {
        self.plugin.as_ref().map(|plugin| PluginDescriptor {
            name: self.package.name.clone(),
            version: decorated_version.to_string(),
            main: plugin.main.clone(),
            api_version: plugin.api_version.clone(),
            description: self.package.description.clone(),
            website: plugin
                .website
                .clone()
                .or_else(|| self.package.website.clone()),
            authors: plugin
                .authors
                .clone()
                .unwrap_or_else(|| self.package.authors.clone()),
            softdepend: plugin.softdepend.clone(),
        })
    }

    /// Built-in resource tokens merged with the user token map.
    ///
    /// User tokens never override the built-ins.
    pub fn token_map(&self, decorated_version: &str) -> BTreeMap<String, String> {
        let mut tokens = self.resources.tokens.clone();
        tokens.insert("project.name".to_string(), self.package.name.clone());
        tokens.insert(
            "project.version".to_string(),
            decorated_version.to_string(),
        );
        if let Some(ref description) = self.package.description {
            tokens.insert("project.description".to_string(), description.clone());
        }
        tokens
    }
}

/// Generate a default Stevedore.toml for a new project.
pub fn generate_default_manifest(name: &str) -> String {
    format!(
        r#"[package]
name = "{name}"
version = "0.1.0-SNAPSHOT"

[build]
classes = "build/classes"
resources = "src/main/resources"

[shade]
minimize = true
relocation_base = "com.example.{name}.lib"
relocate = []

[dependencies]
"#
    )
}
