//! CLI command implementations
//!
//! [`prepare`] turns the command line into a [`Session`]; the submodules
//! print it ([`plan`]) or execute it ([`build`]).

pub mod build;
pub mod plan;

use std::env;
use std::path::PathBuf;

use crate::core::args::BuildConfig;
use crate::core::packages::DependencyTable;
use crate::core::plan::BuildPlan;
use crate::core::settings::Settings;
use crate::error::CasabuildError;
use crate::infra::dirs::CasabuildDirs;
use crate::infra::filesystem::{absolute, canonicalize};

/// Inputs taken from the command line
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Source root; the current directory when absent
    pub directory: Option<PathBuf>,
    /// Explicit settings file
    pub config: Option<PathBuf>,
    /// Parallel jobs (`0` = number of CPUs)
    pub jobs: Option<usize>,
    /// Free-form build arguments
    pub args: Vec<String>,
}

/// Everything needed to print or run a build
#[derive(Debug, Clone)]
pub struct Session {
    /// Directory holding the package directories
    pub source_root: PathBuf,
    /// Loaded settings
    pub settings: Settings,
    /// Dependency table in effect
    pub table: DependencyTable,
    /// Parsed build arguments
    pub config: BuildConfig,
    /// Packages to build, in order
    pub plan: BuildPlan,
}

/// Load settings, parse arguments and compute the build plan
pub fn prepare(options: &SessionOptions) -> Result<Session, CasabuildError> {
    let cwd = env::current_dir()?;
    let source_root = match &options.directory {
        Some(dir) => canonicalize(&absolute(dir, &cwd))?,
        None => cwd,
    };

    let settings = Settings::discover(
        &source_root,
        options.config.as_deref(),
        &CasabuildDirs::new(),
    )?;
    let table = settings.dependency_table()?;
    let defaults = settings.install_defaults(&source_root);

    let mut config = BuildConfig::parse(&options.args, &table, &defaults);
    if let Some(jobs) = options.jobs.or(settings.build.jobs) {
        config = config.with_jobs(effective_jobs(jobs));
    }

    let plan = BuildPlan::from_request(&table, &config.request())?;
    tracing::debug!("Build plan: {:?}", plan.packages());

    Ok(Session {
        source_root,
        settings,
        table,
        config,
        plan,
    })
}

/// `0` jobs means one per CPU
fn effective_jobs(jobs: usize) -> usize {
    if jobs == 0 {
        num_cpus::get()
    } else {
        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options(dir: &TempDir, args: &[&str]) -> SessionOptions {
        SessionOptions {
            directory: Some(dir.path().to_path_buf()),
            config: None,
            jobs: None,
            args: args.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn test_effective_jobs() {
        assert_eq!(effective_jobs(3), 3);
        assert!(effective_jobs(0) >= 1);
    }

    #[test]
    fn test_prepare_resolves_targets() {
        let dir = TempDir::new().unwrap();
        let session = prepare(&options(&dir, &["measures", "debug=1"])).unwrap();

        assert_eq!(
            session.plan.packages(),
            ["casa", "tables", "scimath", "measures"]
        );
        assert_eq!(session.config.targets(), ["measures"]);
        assert_eq!(session.config.backend_args()[0], "debug=1");
    }

    #[test]
    fn test_prepare_uses_project_settings() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("casabuild.toml"),
            "[build]\njobs = 2\n\n[packages.depends]\nlib = []\napp = [\"lib\"]\n",
        )
        .unwrap();

        let session = prepare(&options(&dir, &[])).unwrap();
        assert_eq!(session.plan.packages(), ["lib", "app"]);
        assert_eq!(session.config.backend_args().last().unwrap(), "-j2");
    }

    #[test]
    fn test_prepare_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let mut opts = options(&dir, &[]);
        opts.directory = Some(dir.path().join("missing"));

        assert!(matches!(
            prepare(&opts),
            Err(CasabuildError::Filesystem(_))
        ));
    }
}
