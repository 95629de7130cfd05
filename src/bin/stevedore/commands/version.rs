//! `stevedore version` command

use anyhow::Result;

use crate::cli::VersionArgs;
use stevedore::core::manifest::Manifest;
use stevedore::core::version::decorate_version_at;
use stevedore::util::GlobalContext;

pub fn execute(args: VersionArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let manifest_path = ctx.find_manifest()?;
    let manifest = Manifest::load(&manifest_path)?;

    if args.base {
        println!("{}", manifest.base_version());
        return Ok(());
    }

    let version = decorate_version_at(manifest.base_version(), &manifest.manifest_dir)?;
    println!("{}", version);

    Ok(())
}
