//! Implementation of `stevedore init`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::manifest::{generate_default_manifest, MANIFEST_FILE};
use crate::util::fs;

/// Scaffold a new project in `dir`.
///
/// Writes a default Stevedore.toml and the conventional directory layout.
/// Refuses to overwrite an existing manifest.
pub fn init_project(dir: &Path, name: Option<&str>) -> Result<PathBuf> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if manifest_path.exists() {
        bail!("`{}` already exists in {}", MANIFEST_FILE, dir.display());
    }

    let name = match name {
        Some(name) => name.to_string(),
        None => dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "plugin".to_string()),
    };

    fs::ensure_dir(dir)?;
    fs::write_string(&manifest_path, &generate_default_manifest(&name))?;
    fs::ensure_dir(&dir.join("libs"))?;
    fs::ensure_dir(&dir.join("src").join("main").join("resources"))?;

    Ok(manifest_path)
}
