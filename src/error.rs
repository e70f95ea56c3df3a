//! Error types for casabuild
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::defaults::INTERRUPTED_EXIT_CODE;
use crate::core::settings::SettingsError;

/// Dependency resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    /// Circular dependency detected
    #[error("Circular dependency detected: {}", cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    /// Missing dependency
    #[error("Missing dependency: '{dependency}' required by '{package}'")]
    MissingDependency { package: String, dependency: String },

    /// Default build order names a package the table does not know
    #[error("Package '{name}' in the default build order is not in the dependency table")]
    UnknownPackage { name: String },

    /// Default build order is not dependency-safe
    #[error("Default build order places '{package}' before its prerequisite '{dependency}'")]
    UnsafeOrder { package: String, dependency: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to resolve an absolute path
    #[error("Failed to resolve path '{path}': {error}")]
    Canonicalize { path: PathBuf, error: String },
}

/// Build errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The backend reported a failure
    #[error("Build failed for package '{package}' (exit status {status})")]
    BuildFailed { package: String, status: i32 },

    /// The user interrupted the run
    #[error("Build interrupted while building '{package}'")]
    Interrupted { package: String },

    /// Backend executable not found
    #[error("Build backend '{tool}' not found in PATH")]
    ToolNotFound { tool: String },

    /// Package source directory missing
    #[error("Package directory not found: {}", path.display())]
    PackageDirNotFound { path: PathBuf },

    /// Backend process could not be started
    #[error("Failed to run '{tool}' for package '{package}': {error}")]
    Spawn {
        tool: String,
        package: String,
        error: String,
    },
}

impl BuildError {
    /// Whether the run ended because the user interrupted it
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }

    /// Process exit code for this error
    ///
    /// A failed build exits with the backend's own status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BuildFailed { status, .. } if *status != 0 => *status,
            Self::Interrupted { .. } => INTERRUPTED_EXIT_CODE,
            _ => 1,
        }
    }
}

/// Test execution errors
///
/// None of these stop a build; they are reported and the run continues.
#[derive(Error, Debug)]
pub enum TestError {
    /// Test directory could not be listed
    #[error("Failed to read test directory '{}': {error}", path.display())]
    ReadDir { path: PathBuf, error: String },

    /// Harness could not be started
    #[error("Failed to run test harness '{harness}' on '{test}': {error}")]
    Spawn {
        harness: String,
        test: String,
        error: String,
    },

    /// Search path could not be assembled
    #[error("Invalid search path entry for '{variable}': {error}")]
    SearchPath { variable: String, error: String },

    /// Test name pattern failed to compile
    #[error("Invalid test name pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },
}

/// Top-level casabuild error type
#[derive(Error, Debug)]
pub enum CasabuildError {
    /// Resolver error
    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    /// Build error
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Test error
    #[error("Test error: {0}")]
    Test(#[from] TestError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Settings error
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CasabuildError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Build(e) => e.exit_code(),
            _ => 1,
        }
    }
}
