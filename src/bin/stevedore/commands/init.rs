//! `stevedore init` command

use anyhow::Result;

use crate::cli::InitArgs;
use stevedore::ops::init::init_project;
use stevedore::util::shell::{Shell, Status};

pub fn execute(args: InitArgs, shell: &Shell) -> Result<()> {
    let dir = match args.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    let manifest_path = init_project(&dir, args.name.as_deref())?;

    shell.status(Status::Created, manifest_path.display());

    Ok(())
}
