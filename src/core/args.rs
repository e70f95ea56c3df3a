//! Build argument handling
//!
//! Turns the free-form command line (`tables install prefix=/opt tests=1`)
//! into a typed [`BuildConfig`] once, then renders the argument list handed
//! to the build backend for every package.

use std::path::{Path, PathBuf};

use crate::core::packages::DependencyTable;
use crate::core::plan::BuildRequest;

/// Keyword selecting a system install
const INSTALL_KEYWORD: &str = "install";

/// Backend help flag; disables all argument injection
const HELP_FLAG: &str = "-h";

const PREFIX_KEY: &str = "prefix=";
const CASACOREDIR_KEY: &str = "casacoredir=";
const TESTS_KEY: &str = "tests";

/// Where packages get installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallLocation {
    /// Local install into a staging directory (`prefix` = `casacoredir` = stage)
    Staged { stage_dir: PathBuf },
    /// System install; `casacoredir` follows `prefix` unless given explicitly
    System {
        prefix: Option<String>,
        casacoredir: String,
    },
    /// Backend help requested, nothing is injected
    PassThrough,
}

impl InstallLocation {
    /// Staging directory that must exist before building
    pub fn stage_dir(&self) -> Option<&Path> {
        match self {
            Self::Staged { stage_dir } => Some(stage_dir),
            _ => None,
        }
    }
}

/// Install defaults that apply when the command line does not override them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallDefaults {
    /// Absolute staging directory
    pub stage_dir: PathBuf,
    /// `casacoredir` for a system install without `prefix=`
    pub system_prefix: String,
}

/// Typed build configuration parsed from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Requested packages, in command-line order
    targets: Vec<String>,
    /// Arguments forwarded verbatim
    forwarded: Vec<String>,
    /// Install location
    install: InstallLocation,
    /// Whether unit tests should run after each package
    tests: bool,
    /// Parallel jobs passed to the backend
    jobs: Option<usize>,
}

impl BuildConfig {
    /// Parse raw arguments
    ///
    /// Tokens naming a known package become targets; everything else is
    /// forwarded. Install-location keys are pulled out and re-rendered.
    pub fn parse<S: AsRef<str>>(
        args: &[S],
        table: &DependencyTable,
        defaults: &InstallDefaults,
    ) -> Self {
        let (targets, rest): (Vec<String>, Vec<String>) = args
            .iter()
            .map(|a| a.as_ref().to_string())
            .partition(|a| table.contains(a));

        if rest.iter().any(|a| a == HELP_FLAG) {
            return Self {
                targets,
                forwarded: rest,
                install: InstallLocation::PassThrough,
                tests: false,
                jobs: None,
            };
        }

        let tests = tests_requested(&rest);
        let install_requested = rest.iter().any(|a| a == INSTALL_KEYWORD);
        let prefix = find_value(&rest, PREFIX_KEY);
        let casacoredir = find_value(&rest, CASACOREDIR_KEY);

        let install = if install_requested {
            InstallLocation::System {
                casacoredir: casacoredir
                    .or_else(|| prefix.clone())
                    .unwrap_or_else(|| defaults.system_prefix.clone()),
                prefix,
            }
        } else {
            if prefix.is_some() || casacoredir.is_some() {
                tracing::info!("Ignoring prefix/casacoredir for a staged build");
            }
            InstallLocation::Staged {
                stage_dir: defaults.stage_dir.clone(),
            }
        };

        let forwarded = rest
            .into_iter()
            .filter(|a| {
                a != INSTALL_KEYWORD
                    && !a.starts_with(PREFIX_KEY)
                    && !a.starts_with(CASACOREDIR_KEY)
            })
            .collect();

        Self {
            targets,
            forwarded,
            install,
            tests,
            jobs: None,
        }
    }

    /// Pass `-j<jobs>` to the backend
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Requested packages
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Plan request for these targets
    pub fn request(&self) -> BuildRequest {
        if self.targets.is_empty() {
            BuildRequest::All
        } else {
            BuildRequest::Packages(self.targets.clone())
        }
    }

    /// Install location
    pub fn install(&self) -> &InstallLocation {
        &self.install
    }

    /// Whether tests were requested
    pub fn tests_requested(&self) -> bool {
        self.tests
    }

    /// Prefix the packages are installed under, when known
    pub fn install_prefix(&self) -> Option<PathBuf> {
        match &self.install {
            InstallLocation::Staged { stage_dir } => Some(stage_dir.clone()),
            InstallLocation::System {
                prefix: Some(prefix),
                ..
            } => Some(PathBuf::from(prefix)),
            _ => None,
        }
    }

    /// Prefix the tests run against: only when tests were requested and
    /// the install prefix is known
    pub fn test_prefix(&self) -> Option<PathBuf> {
        if self.tests {
            self.install_prefix()
        } else {
            None
        }
    }

    /// Render the argument list for the build backend
    pub fn backend_args(&self) -> Vec<String> {
        let mut args = self.forwarded.clone();

        match &self.install {
            InstallLocation::PassThrough => return args,
            InstallLocation::Staged { stage_dir } => {
                let stage = stage_dir.display();
                args.push(INSTALL_KEYWORD.to_string());
                args.push(format!("{PREFIX_KEY}{stage}"));
                args.push(format!("{CASACOREDIR_KEY}{stage}"));
            }
            InstallLocation::System {
                prefix,
                casacoredir,
            } => {
                args.push(INSTALL_KEYWORD.to_string());
                if let Some(prefix) = prefix {
                    args.push(format!("{PREFIX_KEY}{prefix}"));
                }
                args.push(format!("{CASACOREDIR_KEY}{casacoredir}"));
            }
        }

        if let Some(jobs) = self.jobs {
            args.push(format!("-j{jobs}"));
        }

        args
    }
}

/// First value given for `key`
fn find_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .find_map(|a| a.strip_prefix(key))
        .map(String::from)
}

/// `tests` or `tests=<value>` with a truthy value
fn tests_requested(args: &[String]) -> bool {
    args.iter()
        .filter_map(|a| {
            if a == TESTS_KEY {
                Some("1")
            } else {
                a.strip_prefix(TESTS_KEY)?.strip_prefix('=')
            }
        })
        .last()
        .is_some_and(|value| {
            !matches!(
                value.to_ascii_lowercase().as_str(),
                "" | "0" | "false" | "no" | "off"
            )
        })
}
