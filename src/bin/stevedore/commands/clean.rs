//! `stevedore clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use stevedore::core::manifest::Manifest;
use stevedore::util::fs::remove_dir_all_if_exists;
use stevedore::util::shell::{Shell, Status};
use stevedore::util::GlobalContext;

pub fn execute(_args: CleanArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let manifest_path = ctx.find_manifest()?;
    let manifest = Manifest::load(&manifest_path)?;

    let output_dir = manifest.manifest_dir.join(&manifest.build.output_dir);
    remove_dir_all_if_exists(&output_dir)?;

    shell.status(Status::Removed, output_dir.display());

    Ok(())
}
