//! `stevedore add` command

use anyhow::Result;

use crate::cli::AddArgs;
use stevedore::ops::add::{add_dependency, AddOptions};
use stevedore::util::shell::{Shell, Status};
use stevedore::util::GlobalContext;

pub fn execute(args: AddArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let manifest_path = ctx.find_manifest()?;

    let opts = AddOptions {
        coordinate: args.coordinate,
        version: args.version,
        host: args.host,
        archive: args.archive,
        url: args.url,
        sha256: args.sha256,
    };

    add_dependency(&manifest_path, &opts)?;

    let mode = if opts.host { "host-provided" } else { "bundled" };
    shell.status(
        Status::Added,
        format!("{} v{} ({})", opts.coordinate, opts.version, mode),
    );

    Ok(())
}
