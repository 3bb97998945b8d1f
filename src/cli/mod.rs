//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit codes for the `forge` binary
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Assetforge - build, version and watch front-end assets
#[derive(Parser)]
#[command(name = "forge")]
#[command(about = "Assetforge - concatenate, minify and version front-end assets")]
#[command(version)]
pub struct Cli {
    /// Path to forge.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root (default: the directory holding forge.toml)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stamp, bump and rebuild every asset class
    Build,

    /// Rebuild affected asset classes when sources change
    Watch {
        /// Clear the terminal before each rebuild
        #[arg(long)]
        clear: bool,

        /// Debounce delay in milliseconds
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        debounce: Option<u32>,
    },

    /// Compile, prefix and minify the stylesheet
    Styles,

    /// Minify the markup shell and fill placeholders
    Markup,

    /// Minify the stand-alone plugin script
    Plugin,

    /// Minify templates into the output tree
    Templates,

    /// Concatenate and minify the script bundle
    Scripts,

    /// Regenerate the documentation
    Docs,

    /// Record the build time in the manifest
    Stamp,

    /// Increment the patch version in the manifest
    Bump,

    /// List tasks and their watch triggers
    List,
}

impl Commands {
    /// Task run by a one-shot command.
    fn task_name(&self) -> Option<&'static str> {
        match self {
            Commands::Build => Some("build"),
            Commands::Styles => Some("styles"),
            Commands::Markup => Some("markup"),
            Commands::Plugin => Some("plugin"),
            Commands::Templates => Some("templates"),
            Commands::Scripts => Some("scripts"),
            Commands::Docs => Some("docs"),
            Commands::Stamp => Some("stamp"),
            Commands::Bump => Some("bump"),
            Commands::Watch { .. } | Commands::List => None,
        }
    }
}

/// Parse arguments and run the selected command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let overrides = match &cli.command {
        Commands::Watch { clear, debounce } => build::overrides(cli.verbose, *clear, *debounce),
        _ => build::overrides(cli.verbose, false, None),
    };

    let project = match build::load_project(cli.config.as_deref(), cli.root.as_deref(), &overrides)
    {
        Ok(project) => project,
        Err(code) => return code,
    };

    if let Some(task) = cli.command.task_name() {
        return build::run_task(&project, task);
    }

    match cli.command {
        Commands::Watch { .. } => build::run_watch(&project),
        Commands::List => build::run_list(&project),
        _ => ExitCode::from(EXIT_INVALID_ARGS),
    }
}
