//! `stevedore assemble` command

use anyhow::Result;

use crate::cli::AssembleArgs;
use stevedore::core::manifest::Manifest;
use stevedore::ops::assemble::{self, AssembleOptions};
use stevedore::util::config::load_config;
use stevedore::util::shell::Shell;
use stevedore::util::GlobalContext;

pub fn execute(args: AssembleArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let manifest_path = ctx.find_manifest()?;
    let manifest = Manifest::load(&manifest_path)?;

    if args.plan {
        let plan = assemble::plan(&manifest)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let config = load_config(&ctx.config_path(), &ctx.project_config_path());

    let opts = AssembleOptions {
        output_dir: args
            .output_dir
            .or_else(|| config.build.output_dir.map(|d| manifest.manifest_dir.join(d))),
        no_minimize: args.no_minimize || config.build.no_minimize,
        offline: args.offline || config.net.offline,
        cache_dir: ctx.cache_dir(),
    };

    assemble::assemble(&manifest, shell, &opts)?;

    Ok(())
}
