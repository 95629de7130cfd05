//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Stevedore - assemble self-contained plugin artifacts
#[derive(Parser)]
#[command(name = "stevedore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble the plugin artifact
    Assemble(AssembleArgs),

    /// Print the decorated version
    Version(VersionArgs),

    /// Show the host-provided/bundled dependency partition
    Deps(DepsArgs),

    /// Add a dependency to Stevedore.toml
    Add(AddArgs),

    /// Remove a dependency from Stevedore.toml
    Remove(RemoveArgs),

    /// Initialize a Stevedore project in an existing directory
    Init(InitArgs),

    /// Remove the output directory
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct AssembleArgs {
    /// Emit the assembly plan as JSON (no assembly)
    #[arg(long)]
    pub plan: bool,

    /// Override the output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Skip minimization even if the manifest enables it
    #[arg(long)]
    pub no_minimize: bool,

    /// Never touch the network; uncached remote archives are fatal
    #[arg(long)]
    pub offline: bool,
}

#[derive(Args)]
pub struct VersionArgs {
    /// Print the base version without decoration
    #[arg(long)]
    pub base: bool,
}

#[derive(Args)]
pub struct DepsArgs {}

#[derive(Args)]
pub struct AddArgs {
    /// Library coordinate (`group:artifact`)
    pub coordinate: String,

    /// Library version
    pub version: String,

    /// Host-provided: excluded from the bundle
    #[arg(long)]
    pub host: bool,

    /// Explicit archive path, relative to the manifest directory
    #[arg(long)]
    pub archive: Option<String>,

    /// Remote archive URL
    #[arg(long)]
    pub url: Option<String>,

    /// Expected SHA256 of the remote archive
    #[arg(long)]
    pub sha256: Option<String>,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// Library coordinate (`group:artifact`)
    pub coordinate: String,
}

#[derive(Args)]
pub struct InitArgs {
    /// Project name (defaults to directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
