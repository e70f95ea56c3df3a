//! Settings file handling
//!
//! Reads `casabuild.toml` (project) or `config.toml` (per user). Settings
//! cover the tools to invoke, install locations, test discovery, and an
//! optional replacement for the built-in dependency table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::defaults::{
    DEFAULT_BUILD_BACKEND, DEFAULT_DATA_PATH_VAR, DEFAULT_PASS_MARKERS, DEFAULT_STAGE_DIR,
    DEFAULT_SYSTEM_PREFIX, DEFAULT_TESTS_DIR, DEFAULT_TEST_HARNESS, DEFAULT_TEST_PREFIX,
    SETTINGS_FILE_NAME,
};
use crate::core::args::InstallDefaults;
use crate::core::assay::TestTrigger;
use crate::core::packages::DependencyTable;
use crate::error::ResolverError;
use crate::infra::dirs::CasabuildDirs;
use crate::infra::filesystem::absolute;

/// Settings error types
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Explicitly requested settings file is missing
    #[error("Settings file not found: {path}")]
    NotFound { path: String },

    /// Failed to read settings file
    #[error("Failed to read settings file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse settings file
    #[error("Failed to parse settings file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// All settings for a casabuild run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// External tools
    #[serde(default)]
    pub tools: ToolSettings,

    /// Install locations and backend defaults
    #[serde(default)]
    pub build: BuildSettings,

    /// Test discovery and classification
    #[serde(default)]
    pub tests: TestSettings,

    /// Custom dependency table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<PackageSettings>,
}

/// External tool commands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Build backend command
    pub backend: Option<String>,

    /// Test harness command
    pub harness: Option<String>,
}

/// Install locations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Staging directory, relative to the source root unless absolute
    pub stage_dir: Option<String>,

    /// `casacoredir` for system installs without `prefix=`
    pub system_prefix: Option<String>,

    /// Parallel jobs passed to the backend
    pub jobs: Option<usize>,
}

/// Test discovery settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSettings {
    /// Test directory inside each package
    pub directory: Option<String>,

    /// Test executable name prefix
    pub prefix: Option<String>,

    /// Harness output markers meaning "passed"
    pub pass_markers: Option<Vec<String>>,

    /// Variable pointing tests at their data directory
    pub data_path_var: Option<String>,
}

/// Custom dependency table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageSettings {
    /// "Build everything" order; derived from the table when absent
    pub order: Option<Vec<String>>,

    /// Package -> direct prerequisites
    #[serde(default)]
    pub depends: BTreeMap<String, Vec<String>>,
}

impl Settings {
    /// Find and load settings
    ///
    /// An explicit path must exist. Otherwise `<source_root>/casabuild.toml`
    /// is used when present, then the per-user config file, then defaults.
    pub fn discover(
        source_root: &Path,
        explicit: Option<&Path>,
        dirs: &CasabuildDirs,
    ) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(SettingsError::NotFound {
                    path: path.display().to_string(),
                });
            }
            return Self::load_from_path(path);
        }

        let project = source_root.join(SETTINGS_FILE_NAME);
        if project.is_file() {
            tracing::debug!("Using settings from {}", project.display());
            return Self::load_from_path(&project);
        }

        Self::load_from_path(&dirs.user_config_path())
    }

    /// Load settings from a specific path
    ///
    /// A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| SettingsError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Effective build backend command
    #[must_use]
    pub fn backend(&self) -> &str {
        self.tools.backend.as_deref().unwrap_or(DEFAULT_BUILD_BACKEND)
    }

    /// Effective test harness command
    #[must_use]
    pub fn harness(&self) -> &str {
        self.tools.harness.as_deref().unwrap_or(DEFAULT_TEST_HARNESS)
    }

    /// Effective test directory name
    #[must_use]
    pub fn tests_dir(&self) -> &str {
        self.tests.directory.as_deref().unwrap_or(DEFAULT_TESTS_DIR)
    }

    /// Install defaults for a source root
    #[must_use]
    pub fn install_defaults(&self, source_root: &Path) -> InstallDefaults {
        let stage = self.build.stage_dir.as_deref().unwrap_or(DEFAULT_STAGE_DIR);
        InstallDefaults {
            stage_dir: absolute(&PathBuf::from(stage), source_root),
            system_prefix: self
                .build
                .system_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PREFIX.to_string()),
        }
    }

    /// Test trigger for `prefix` using the configured discovery rules
    #[must_use]
    pub fn test_trigger(&self, prefix: PathBuf) -> TestTrigger {
        let markers = self.tests.pass_markers.clone().unwrap_or_else(|| {
            DEFAULT_PASS_MARKERS.iter().map(|m| (*m).to_string()).collect()
        });

        TestTrigger::new(prefix)
            .with_executable_prefix(self.tests.prefix.as_deref().unwrap_or(DEFAULT_TEST_PREFIX))
            .with_pass_markers(markers)
            .with_data_path_var(
                self.tests
                    .data_path_var
                    .as_deref()
                    .unwrap_or(DEFAULT_DATA_PATH_VAR),
            )
    }

    /// Dependency table: the configured one, or the built-in casacore table
    pub fn dependency_table(&self) -> Result<DependencyTable, ResolverError> {
        match &self.packages {
            Some(packages) => {
                DependencyTable::new(packages.depends.clone(), packages.order.clone())
            }
            None => Ok(DependencyTable::casacore()),
        }
    }
}
