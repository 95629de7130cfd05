//! `stevedore remove` command

use anyhow::Result;

use crate::cli::RemoveArgs;
use stevedore::ops::add::remove_dependency;
use stevedore::util::shell::{Shell, Status};
use stevedore::util::GlobalContext;

pub fn execute(args: RemoveArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let manifest_path = ctx.find_manifest()?;

    remove_dependency(&manifest_path, &args.coordinate)?;

    shell.status(Status::Removed, &args.coordinate);

    Ok(())
}
