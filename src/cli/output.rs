//! Output formatting and progress indicators
//!
//! This module provides utilities for displaying progress bars,
//! formatted messages, and errors to the user.

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::core::assay::{TestReport, TestStatus};
use crate::core::builder::{BuildReporter, BuildSummary};

/// Create a progress bar for build steps
pub fn create_build_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} packages ({msg})")
            .expect("Invalid progress bar template")
            .progress_chars("█▓▒░"),
    );
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Output settings derived from `-q`, `--json` and `-v`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Only errors are printed
    pub quiet: bool,
    /// Machine-readable output on stdout
    pub json: bool,
    /// Verbosity level (number of `-v`)
    pub verbose: u8,
}

impl OutputConfig {
    /// Create an output configuration
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Log level when `RUST_LOG` is not set
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::ERROR;
        }
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            _ => LevelFilter::DEBUG,
        }
    }

    /// Whether human-oriented progress output is shown
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }

    /// Install the global tracing subscriber
    ///
    /// Logs go to stderr so `--json` output on stdout stays parseable.
    pub fn apply_global(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level().to_string()));

        // A subscriber may already be installed (tests); keep it
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Print an error and its causes to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  Caused by: {cause}");
    }
}

/// Print a notice for a user interruption
pub fn display_interrupted(error: &anyhow::Error) {
    eprintln!("{} {error}", status::WARNING);
}

/// Build reporter drawing an `indicatif` progress bar
pub struct ConsoleReporter {
    bar: ProgressBar,
}

impl ConsoleReporter {
    /// Reporter for a plan of `total` packages
    pub fn new(total: usize, output: &OutputConfig) -> Self {
        let bar = if output.show_progress() {
            create_build_bar(total as u64)
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl BuildReporter for ConsoleReporter {
    fn package_started(&self, index: usize, _total: usize, package: &str) {
        self.bar.set_position(index as u64);
        self.bar.set_message(package.to_string());
        self.bar.println(format!("{} Building package: {package}", status::INFO));
    }

    fn package_built(&self, package: &str) {
        self.bar.inc(1);
        self.bar.println(format!("{} Built {package}", status::SUCCESS));
    }

    fn tests_finished(&self, report: &TestReport) {
        for result in &report.results {
            let prefix = match result.status {
                TestStatus::Passed => status::SUCCESS,
                TestStatus::Failed => status::ERROR,
            };
            self.bar
                .println(format!("  {prefix} {}/{}", report.package, result.name));
        }
    }
}

/// Human-readable lines summarising a finished run
pub fn summary_lines(summary: &BuildSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "{} Build complete: {} package(s)",
        status::SUCCESS,
        summary.built.len()
    )];

    if !summary.tests.is_empty() {
        let failed = summary.tests_failed();
        let prefix = if failed == 0 {
            status::SUCCESS
        } else {
            status::WARNING
        };
        lines.push(format!(
            "{prefix} Tests: {} passed, {failed} failed",
            summary.tests_passed()
        ));
        for report in summary.tests.iter().filter(|r| !r.is_success()) {
            for result in report
                .results
                .iter()
                .filter(|r| r.status == TestStatus::Failed)
            {
                lines.push(format!("  {} {}/{}", status::ERROR, report.package, result.name));
            }
        }
    }

    lines
}
