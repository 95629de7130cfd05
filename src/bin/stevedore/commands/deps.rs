//! `stevedore deps` command

use anyhow::Result;

use crate::cli::DepsArgs;
use stevedore::core::dependency::Partition;
use stevedore::core::manifest::Manifest;
use stevedore::util::GlobalContext;

pub fn execute(_args: DepsArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let manifest_path = ctx.find_manifest()?;
    let manifest = Manifest::load(&manifest_path)?;

    let partition = Partition::of(manifest.dependencies.iter().cloned());

    if partition.is_empty() {
        println!("no dependencies declared");
        return Ok(());
    }

    println!("host-provided ({}):", partition.host.len());
    for decl in &partition.host {
        println!("  {} {}", decl.coordinate, decl.version);
    }

    println!("bundled ({}):", partition.bundled.len());
    for decl in &partition.bundled {
        println!("  {} {}", decl.coordinate, decl.version);
    }

    Ok(())
}
