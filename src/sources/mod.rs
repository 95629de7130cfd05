//! Bundled archive resolution.
//!
//! Host-provided dependencies are never resolved to files; bundled ones
//! must resolve to an archive on disk before shading starts. Resolution
//! order: explicit `archive` path, remote `url` (fetched into the cache),
//! then the default location `{lib_dir}/{artifact}-{version}.{ext}`.

pub mod fetch;

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::core::dependency::{DependencyDecl, DependencyMode};

/// Errors resolving a bundled dependency to an archive.
#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("bundled dependency `{coordinate}` could not be resolved: no archive at {}", path.display())]
    #[diagnostic(
        code(stevedore::resolve::unresolved),
        help("place the archive in the lib directory, or declare an explicit \
              `archive` path or a `url` for it")
    )]
    Unresolved { coordinate: String, path: PathBuf },

    #[error("failed to fetch bundled dependency `{coordinate}` from {url}")]
    #[diagnostic(code(stevedore::resolve::fetch))]
    Fetch {
        coordinate: String,
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("dependency `{coordinate}` is host-provided and has no archive")]
    #[diagnostic(code(stevedore::resolve::host_provided))]
    HostProvided { coordinate: String },
}

/// Resolve a bundled declaration to an archive path on disk.
pub fn resolve_archive(
    decl: &DependencyDecl,
    manifest_dir: &Path,
    lib_dir: &Path,
    extension: &str,
    cache_dir: &Path,
) -> Result<PathBuf, ResolveError> {
    if decl.mode == DependencyMode::HostProvided {
        return Err(ResolveError::HostProvided {
            coordinate: decl.coordinate.to_string(),
        });
    }

    if let Some(ref archive) = decl.archive {
        let path = manifest_dir.join(archive);
        return if path.is_file() {
            Ok(path)
        } else {
            Err(ResolveError::Unresolved {
                coordinate: decl.coordinate.to_string(),
                path,
            })
        };
    }

    let file_name = decl.coordinate.archive_file_name(&decl.version, extension);

    if let Some(ref url) = decl.url {
        return fetch::fetch_archive(url, cache_dir, &file_name, decl.sha256.as_deref()).map_err(
            |source| ResolveError::Fetch {
                coordinate: decl.coordinate.to_string(),
                url: url.clone(),
                source: source.into(),
            },
        );
    }

    let path = manifest_dir.join(lib_dir).join(&file_name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(ResolveError::Unresolved {
            coordinate: decl.coordinate.to_string(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn decl(coordinate: &str, version: &str) -> DependencyDecl {
        DependencyDecl {
            coordinate: coordinate.parse().unwrap(),
            version: version.to_string(),
            mode: DependencyMode::Bundled,
            archive: None,
            url: None,
            sha256: None,
        }
    }

    #[test]
    fn test_resolve_from_lib_dir() {
        let tmp = TempDir::new().unwrap();
        let libs = tmp.path().join("libs");
        std::fs::create_dir_all(&libs).unwrap();
        std::fs::write(libs.join("cloud-paper-2.0.0.jar"), b"bytes").unwrap();

        let path = resolve_archive(
            &decl("org.incendo:cloud-paper", "2.0.0"),
            tmp.path(),
            Path::new("libs"),
            "jar",
            tmp.path(),
        )
        .unwrap();
        assert_eq!(path, libs.join("cloud-paper-2.0.0.jar"));
    }

    #[test]
    fn test_unresolved_names_coordinate() {
        let tmp = TempDir::new().unwrap();
        let err = resolve_archive(
            &decl("org.incendo:cloud-paper", "2.0.0"),
            tmp.path(),
            Path::new("libs"),
            "jar",
            tmp.path(),
        )
        .unwrap_err();

        assert!(matches!(err, ResolveError::Unresolved { .. }));
        assert!(err.to_string().contains("org.incendo:cloud-paper"));
    }

    #[test]
    fn test_explicit_archive_path() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("custom.jar"), b"bytes").unwrap();

        let mut dep = decl("dev.triumphteam:triumph-gui", "3.1.7");
        dep.archive = Some(PathBuf::from("custom.jar"));

        let path = resolve_archive(&dep, tmp.path(), Path::new("libs"), "jar", tmp.path()).unwrap();
        assert_eq!(path, tmp.path().join("custom.jar"));
    }

    #[test]
    fn test_explicit_archive_missing_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let mut dep = decl("dev.triumphteam:triumph-gui", "3.1.7");
        dep.archive = Some(PathBuf::from("missing.jar"));

        let err =
            resolve_archive(&dep, tmp.path(), Path::new("libs"), "jar", tmp.path()).unwrap_err();
        assert!(err.to_string().contains("dev.triumphteam:triumph-gui"));
    }

    #[test]
    fn test_host_provided_never_resolves() {
        let tmp = TempDir::new().unwrap();
        let mut dep = decl("org.spigotmc:spigot-api", "1.20.4");
        dep.mode = DependencyMode::HostProvided;

        let err =
            resolve_archive(&dep, tmp.path(), Path::new("libs"), "jar", tmp.path()).unwrap_err();
        assert!(matches!(err, ResolveError::HostProvided { .. }));
    }

    #[test]
    fn test_url_uses_cache() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("adventure-4.3.2.jar"), b"bytes").unwrap();

        let mut dep = decl("net.kyori:adventure", "4.3.2");
        dep.url = Some("http://invalid.invalid/adventure.jar".to_string());

        let path = resolve_archive(&dep, tmp.path(), Path::new("libs"), "jar", &cache).unwrap();
        assert_eq!(path, cache.join("adventure-4.3.2.jar"));
    }
}
