//! Archive container I/O for the shading stage.
//!
//! Entries are kept in memory as (path, bytes) pairs; the container on
//! disk is ZIP. Entry paths always use forward slashes, matching the
//! container format regardless of host platform.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Component, Path};

use anyhow::{bail, Context, Result};
use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Where an entry came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOrigin {
    /// The project's own classes, resources, or generated descriptor.
    Project,

    /// A bundled dependency, identified by its coordinate.
    Bundled(String),
}

/// One artifact entry.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Slash-separated path inside the artifact
    pub path: String,

    /// Entry contents
    pub data: Vec<u8>,

    /// Provenance, used by minimize and templating
    pub origin: EntryOrigin,
}

impl Entry {
    /// Create a project-origin entry.
    pub fn project(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Entry {
            path: path.into(),
            data: data.into(),
            origin: EntryOrigin::Project,
        }
    }

    /// Whether this entry is a compiled class.
    pub fn is_class(&self) -> bool {
        self.path.ends_with(".class")
    }

    /// Whether this entry came from a bundled dependency.
    pub fn is_bundled(&self) -> bool {
        matches!(self.origin, EntryOrigin::Bundled(_))
    }
}

/// Read all file entries of an archive, tagging them with an origin.
pub fn read_archive(path: &Path, origin: EntryOrigin) -> Result<Vec<Entry>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open archive: {}", path.display()))?;

    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("failed to read archive: {}", path.display()))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .with_context(|| format!("failed to read entry {} of {}", i, path.display()))?;

        if file.is_dir() {
            continue;
        }

        let name = file.name().to_string();
        validate_entry_path(&name)
            .with_context(|| format!("in archive {}", path.display()))?;

        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)
            .with_context(|| format!("failed to read entry `{}`", name))?;

        entries.push(Entry {
            path: name,
            data,
            origin: origin.clone(),
        });
    }

    Ok(entries)
}

/// Walk a directory tree into project entries, rooted at `root`.
pub fn walk_dir(root: &Path) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("failed to walk directory: {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(root)
            .expect("walkdir yields paths under root");
        let path = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let data = std::fs::read(entry.path())
            .with_context(|| format!("failed to read file: {}", entry.path().display()))?;

        entries.push(Entry::project(path, data));
    }

    Ok(entries)
}

/// Write entries as a ZIP archive, atomically (temp file + rename).
pub fn write_archive(path: &Path, entries: &[Entry]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;

    {
        let mut zip = ZipWriter::new(tmp.as_file_mut());
        // Fixed timestamp keeps the artifact byte-identical across runs.
        let options = SimpleFileOptions::default().last_modified_time(zip::DateTime::default());

        for entry in entries {
            zip.start_file(entry.path.as_str(), options)
                .with_context(|| format!("failed to start entry `{}`", entry.path))?;
            zip.write_all(&entry.data)
                .with_context(|| format!("failed to write entry `{}`", entry.path))?;
        }

        zip.finish().context("failed to finalize archive")?;
    }

    tmp.persist(path)
        .with_context(|| format!("failed to write artifact: {}", path.display()))?;

    Ok(())
}

/// Reject entry paths that would escape an extraction root.
///
/// The tool never extracts to disk, but a hostile name would still end up
/// in the output artifact, so it is refused at the door.
fn validate_entry_path(name: &str) -> Result<()> {
    let path = Path::new(name);
    if path.is_absolute() {
        bail!("absolute entry path: {}", name);
    }
    for component in path.components() {
        if matches!(component, Component::ParentDir) {
            bail!("path traversal in entry: {}", name);
        }
    }
    Ok(())
}
