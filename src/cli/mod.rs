//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use anyhow::Result;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use commands::build::BuildOptions;
use commands::SessionOptions;
use output::OutputConfig;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

/// casabuild - dependency-ordered builds of the casacore packages
///
/// Resolves the requested packages and their prerequisites, then runs the
/// build backend in each package directory. Unrecognised arguments are
/// passed to the backend; `-h` shows the backend's help.
#[derive(Parser, Debug)]
#[command(name = "casabuild")]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long)]
    pub json: bool,

    /// Source root holding the package directories
    #[arg(long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Settings file
    #[arg(long, value_name = "FILE", env = "CASABUILD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Build backend command
    #[arg(long, value_name = "CMD", env = "CASABUILD_BACKEND")]
    pub backend: Option<String>,

    /// Test harness command
    #[arg(long, value_name = "CMD", env = "CASABUILD_HARNESS")]
    pub harness: Option<String>,

    /// Parallel jobs for the backend (0 = one per CPU)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Print the build plan and backend arguments without building
    #[arg(long)]
    pub dry_run: bool,

    /// List known packages and their direct prerequisites
    #[arg(long)]
    pub list: bool,

    /// Print help (`-h` is passed to the backend)
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Packages to build and arguments for the backend
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,
}

impl Cli {
    /// Output settings for this invocation
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig::new(self.quiet, self.json, self.verbose)
    }

    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let output = self.output_config();
        let session = commands::prepare(&SessionOptions {
            directory: self.directory,
            config: self.config,
            jobs: self.jobs,
            args: self.args,
        })?;

        if self.list {
            return commands::plan::list(&session.table, output.json);
        }
        if self.dry_run {
            return commands::plan::dry_run(&session, output.json);
        }

        let options = BuildOptions {
            backend: self.backend,
            harness: self.harness,
        };
        commands::build::execute(session, options, output).await?;
        Ok(())
    }
}
