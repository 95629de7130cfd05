//! Implementation of `stevedore add` and `stevedore remove`.

use std::path::Path;

use anyhow::{bail, Context, Result};
use toml_edit::{value, DocumentMut, InlineTable, Item, Table};

use crate::core::coordinate::Coordinate;
use crate::util::fs;

/// Options for adding a dependency.
#[derive(Debug, Clone)]
pub struct AddOptions {
    /// Library coordinate (`group:artifact`)
    pub coordinate: String,

    /// Library version
    pub version: String,

    /// Host-provided: excluded from the bundle
    pub host: bool,

    /// Explicit archive path
    pub archive: Option<String>,

    /// Remote archive URL
    pub url: Option<String>,

    /// Expected SHA256 of the remote archive
    pub sha256: Option<String>,
}

/// Add a dependency to Stevedore.toml.
pub fn add_dependency(manifest_path: &Path, opts: &AddOptions) -> Result<()> {
    // Validate the coordinate before touching the file.
    opts.coordinate
        .parse::<Coordinate>()
        .with_context(|| format!("invalid coordinate `{}`", opts.coordinate))?;

    let content = fs::read_to_string(manifest_path)?;
    let mut doc: DocumentMut = content
        .parse()
        .with_context(|| "failed to parse Stevedore.toml")?;

    if !doc.contains_key("dependencies") {
        doc["dependencies"] = Item::Table(Table::new());
    }

    doc["dependencies"][&opts.coordinate] = build_dependency_value(opts);

    fs::write_string(manifest_path, &doc.to_string())?;

    Ok(())
}

/// Build the TOML value for a dependency declaration.
fn build_dependency_value(opts: &AddOptions) -> Item {
    let needs_table =
        opts.host || opts.archive.is_some() || opts.url.is_some() || opts.sha256.is_some();

    if !needs_table {
        return value(opts.version.clone());
    }

    let mut table = InlineTable::new();
    table.insert("version", opts.version.clone().into());

    if opts.host {
        table.insert("host", true.into());
    }
    if let Some(ref archive) = opts.archive {
        table.insert("archive", archive.clone().into());
    }
    if let Some(ref url) = opts.url {
        table.insert("url", url.clone().into());
    }
    if let Some(ref sha256) = opts.sha256 {
        table.insert("sha256", sha256.clone().into());
    }

    Item::Value(table.into())
}

/// Remove a dependency from Stevedore.toml.
pub fn remove_dependency(manifest_path: &Path, coordinate: &str) -> Result<()> {
    let content = fs::read_to_string(manifest_path)?;
    let mut doc: DocumentMut = content
        .parse()
        .with_context(|| "failed to parse Stevedore.toml")?;

    let Some(deps) = doc.get_mut("dependencies").and_then(Item::as_table_mut) else {
        bail!("no dependencies in Stevedore.toml");
    };

    if deps.remove(coordinate).is_none() {
        bail!("dependency `{}` not found in Stevedore.toml", coordinate);
    }

    fs::write_string(manifest_path, &doc.to_string())?;

    Ok(())
}
