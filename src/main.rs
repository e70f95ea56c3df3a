//! casabuild - dependency-ordered build driver for casacore
//!
//! Entry point for the casabuild command-line application.

use anyhow::Result;
use clap::Parser;

use casabuild::cli::output::{display_error, display_interrupted};
use casabuild::cli::Cli;
use casabuild::error::{BuildError, CasabuildError};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging level follows -v/-q unless RUST_LOG is set
    let output_config = cli.output_config();
    output_config.apply_global();

    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let code = exit_code(&e);
            let interrupted = e
                .downcast_ref::<BuildError>()
                .is_some_and(BuildError::is_interrupted);
            if interrupted {
                display_interrupted(&e);
            } else {
                display_error(&e);
            }
            std::process::exit(code);
        }
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    if let Some(e) = error.downcast_ref::<BuildError>() {
        e.exit_code()
    } else if let Some(e) = error.downcast_ref::<CasabuildError>() {
        e.exit_code()
    } else {
        1
    }
}
