//! Dependency declarations and the host/bundled partition.
//!
//! Every declared dependency carries exactly one mode: *host-provided*
//! (assumed present in the runtime the artifact is loaded into, never
//! embedded) or *bundled* (embedded into the output artifact). The mode
//! is a single field, so the partition is exhaustive and non-overlapping
//! by construction.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::coordinate::Coordinate;

/// How a dependency participates in the output artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyMode {
    /// Present in the host runtime; excluded from the bundle.
    HostProvided,
    /// Embedded in the output artifact.
    Bundled,
}

impl DependencyMode {
    /// Short label used in `deps` output and plans.
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyMode::HostProvided => "host",
            DependencyMode::Bundled => "bundled",
        }
    }
}

/// Dependency specification as it appears in Stevedore.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    /// Simple version string: `"org.incendo:cloud-paper" = "2.0.0"`
    Simple(String),

    /// Detailed specification
    Detailed(DetailedDependencySpec),
}

/// Detailed dependency specification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailedDependencySpec {
    /// Library version
    pub version: String,

    /// Host-provided: assumed present in the runtime, never embedded
    #[serde(default)]
    pub host: bool,

    /// Explicit path to the archive, relative to the manifest directory
    #[serde(default)]
    pub archive: Option<PathBuf>,

    /// Remote archive URL, fetched into the cache
    #[serde(default)]
    pub url: Option<String>,

    /// Expected SHA256 of the remote archive
    #[serde(default)]
    pub sha256: Option<String>,
}

/// A fully-parsed dependency declaration.
#[derive(Debug, Clone)]
pub struct DependencyDecl {
    /// Library coordinate
    pub coordinate: Coordinate,

    /// Library version (opaque string; `1.0-SNAPSHOT` is valid here)
    pub version: String,

    /// Exactly one mode per declaration
    pub mode: DependencyMode,

    /// Explicit archive path (bundled only)
    pub archive: Option<PathBuf>,

    /// Remote archive URL (bundled only)
    pub url: Option<String>,

    /// Expected SHA256 of the remote archive
    pub sha256: Option<String>,
}

impl DependencyDecl {
    /// Build a declaration from its manifest spec.
    pub fn from_spec(coordinate: Coordinate, spec: &DependencySpec) -> Self {
        match spec {
            DependencySpec::Simple(version) => DependencyDecl {
                coordinate,
                version: version.clone(),
                mode: DependencyMode::Bundled,
                archive: None,
                url: None,
                sha256: None,
            },
            DependencySpec::Detailed(detail) => DependencyDecl {
                coordinate,
                version: detail.version.clone(),
                mode: if detail.host {
                    DependencyMode::HostProvided
                } else {
                    DependencyMode::Bundled
                },
                archive: detail.archive.clone(),
                url: detail.url.clone(),
                sha256: detail.sha256.clone(),
            },
        }
    }

    /// Whether this dependency must be embedded in the artifact.
    pub fn is_bundled(&self) -> bool {
        self.mode == DependencyMode::Bundled
    }
}

/// The host/bundled split of a set of declarations.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// Host-provided declarations, sorted by coordinate.
    pub host: Vec<DependencyDecl>,

    /// Bundled declarations, sorted by coordinate.
    pub bundled: Vec<DependencyDecl>,
}

impl Partition {
    /// Partition declarations into host-provided and bundled sets.
    ///
    /// The result is deterministic regardless of map iteration order.
    pub fn of(decls: impl IntoIterator<Item = DependencyDecl>) -> Self {
        let mut partition = Partition::default();
        for decl in decls {
            match decl.mode {
                DependencyMode::HostProvided => partition.host.push(decl),
                DependencyMode::Bundled => partition.bundled.push(decl),
            }
        }
        partition.host.sort_by(|a, b| a.coordinate.cmp(&b.coordinate));
        partition
            .bundled
            .sort_by(|a, b| a.coordinate.cmp(&b.coordinate));
        partition
    }

    /// Total number of declarations in both sets.
    pub fn len(&self) -> usize {
        self.host.len() + self.bundled.len()
    }

    /// Whether no dependencies are declared.
    pub fn is_empty(&self) -> bool {
        self.host.is_empty() && self.bundled.is_empty()
    }
}
