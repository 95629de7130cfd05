//! Stevedore CLI - assembles self-contained plugin artifacts

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use stevedore::core::manifest::ManifestError;
use stevedore::core::version::VersionError;
use stevedore::sources::ResolveError;
use stevedore::util::diagnostic::{self, suggestions, Diagnostic};
use stevedore::util::shell::{ColorChoice, Shell};

fn main() {
    let cli = Cli::parse();

    let color = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let shell = Shell::from_flags(cli.quiet, cli.verbose, color);

    if let Err(e) = run(cli, &shell) {
        let mut diag = Diagnostic::error(format!("{:#}", e));
        if e.downcast_ref::<ManifestError>().is_some() {
            diag = diag.with_suggestion(suggestions::NO_MANIFEST);
        } else if e.downcast_ref::<VersionError>().is_some() {
            diag = diag.with_suggestion(suggestions::NO_COMMIT);
        } else if matches!(e.downcast_ref::<ResolveError>(), Some(ResolveError::Unresolved { .. })) {
            diag = diag.with_suggestion(suggestions::MISSING_ARCHIVE);
        } else if matches!(e.downcast_ref::<ResolveError>(), Some(ResolveError::Fetch { .. })) {
            diag = diag.with_suggestion(suggestions::FETCH_FAILED);
        }
        diagnostic::emit(&diag, shell.use_color());
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("stevedore=debug")
    } else {
        EnvFilter::new("stevedore=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Assemble(args) => commands::assemble::execute(args, shell),
        Commands::Version(args) => commands::version::execute(args),
        Commands::Deps(args) => commands::deps::execute(args),
        Commands::Add(args) => commands::add::execute(args, shell),
        Commands::Remove(args) => commands::remove::execute(args, shell),
        Commands::Init(args) => commands::init::execute(args, shell),
        Commands::Clean(args) => commands::clean::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
