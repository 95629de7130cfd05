//! Remote archive fetching.
//!
//! Downloads a bundled dependency archive into the global cache and
//! verifies it against an expected SHA256 when one is declared. A cached
//! copy that still matches its checksum is reused without touching the
//! network.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tempfile::NamedTempFile;

use crate::util::hash::{sha256_bytes, sha256_file};

/// Fetch `url` into `cache_dir/file_name`, reusing a valid cached copy.
pub fn fetch_archive(
    url: &str,
    cache_dir: &Path,
    file_name: &str,
    expected_sha256: Option<&str>,
) -> Result<PathBuf> {
    let cached = cache_dir.join(file_name);

    if cached.exists() {
        match expected_sha256 {
            None => {
                tracing::debug!("using cached archive {}", cached.display());
                return Ok(cached);
            }
            Some(expected) => {
                let actual = sha256_file(&cached)?;
                if actual == expected {
                    tracing::debug!("using cached archive {}", cached.display());
                    return Ok(cached);
                }
                tracing::warn!(
                    "cached archive {} fails checksum, re-downloading",
                    cached.display()
                );
            }
        }
    }

    download(url, &cached, expected_sha256)?;
    Ok(cached)
}

fn download(url: &str, dest: &Path, expected_sha256: Option<&str>) -> Result<()> {
    tracing::info!("Fetching archive from {}", url);

    let response = reqwest::blocking::get(url)
        .with_context(|| format!("failed to download archive from {}", url))?;

    if !response.status().is_success() {
        bail!(
            "failed to download archive from {}: HTTP {}",
            url,
            response.status()
        );
    }

    let bytes = response
        .bytes()
        .with_context(|| "failed to read archive response body")?;

    if let Some(expected) = expected_sha256 {
        let actual = sha256_bytes(&bytes);
        if actual != expected {
            bail!(
                "archive hash mismatch for {}:\n  expected: {}\n  actual:   {}",
                url,
                expected,
                actual
            );
        }
        tracing::debug!("archive hash verified: {}", &actual[..16]);
    }

    let dir = dest.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create cache directory: {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(&bytes)
        .context("failed to write downloaded archive")?;
    tmp.persist(dest)
        .with_context(|| format!("failed to place archive at {}", dest.display()))?;

    Ok(())
}
