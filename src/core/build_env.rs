//! Execution context for package builds and tests
//!
//! Holds the source root and the search paths inherited from the caller.
//! Child processes get their working directory and environment overrides from
//! here; the driver's own working directory and environment stay untouched.

use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::defaults::DEFAULT_TESTS_DIR;
use crate::error::TestError;

/// Executable search path variable
pub const PATH_VAR: &str = "PATH";

/// Shared-library search path variable for the host platform
pub fn library_path_var() -> &'static str {
    if cfg!(target_os = "macos") {
        "DYLD_LIBRARY_PATH"
    } else {
        "LD_LIBRARY_PATH"
    }
}

/// Explicit execution context threaded through the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Directory holding one subdirectory per package
    source_root: PathBuf,
    /// Test directory name inside a package
    tests_dir: String,
    /// Name of the shared-library search variable
    library_var: String,
    /// Inherited shared-library search path
    library_path: Option<OsString>,
    /// Inherited executable search path
    path: Option<OsString>,
}

impl ExecutionContext {
    /// Context with no inherited search paths
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            tests_dir: DEFAULT_TESTS_DIR.to_string(),
            library_var: library_path_var().to_string(),
            library_path: None,
            path: None,
        }
    }

    /// Context inheriting the current process's search paths
    pub fn from_process(source_root: impl Into<PathBuf>) -> Self {
        let library_var = library_path_var();
        Self {
            library_path: env::var_os(library_var),
            path: env::var_os(PATH_VAR),
            ..Self::new(source_root)
        }
    }

    /// Set the test directory name
    #[must_use]
    pub fn with_tests_dir(mut self, tests_dir: &str) -> Self {
        self.tests_dir = tests_dir.to_string();
        self
    }

    /// Set the inherited search paths
    #[must_use]
    pub fn with_search_paths(
        mut self,
        library_path: Option<OsString>,
        path: Option<OsString>,
    ) -> Self {
        self.library_path = library_path;
        self.path = path;
        self
    }

    /// Source root
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Source directory of `package`
    pub fn package_dir(&self, package: &str) -> PathBuf {
        self.source_root.join(package)
    }

    /// Test directory of `package`
    pub fn test_dir(&self, package: &str) -> PathBuf {
        self.package_dir(package).join(&self.tests_dir)
    }

    /// Environment overrides for running tests against an install prefix
    ///
    /// `<prefix>/lib` is prepended to the library search path, `<prefix>/bin`
    /// to `PATH`, and `data_var` points at the test directory.
    pub fn test_env(
        &self,
        prefix: &Path,
        test_dir: &Path,
        data_var: &str,
    ) -> Result<BTreeMap<String, String>, TestError> {
        let mut env = BTreeMap::new();
        env.insert(
            self.library_var.clone(),
            prepend_search_path(
                &self.library_var,
                &prefix.join("lib"),
                self.library_path.as_ref(),
            )?,
        );
        env.insert(
            PATH_VAR.to_string(),
            prepend_search_path(PATH_VAR, &prefix.join("bin"), self.path.as_ref())?,
        );
        env.insert(data_var.to_string(), test_dir.display().to_string());
        Ok(env)
    }
}

/// Put `entry` in front of an existing search path
fn prepend_search_path(
    variable: &str,
    entry: &Path,
    existing: Option<&OsString>,
) -> Result<String, TestError> {
    let mut entries = vec![entry.to_path_buf()];
    if let Some(existing) = existing.filter(|e| !e.is_empty()) {
        entries.extend(env::split_paths(existing));
    }

    let joined = env::join_paths(entries).map_err(|e| TestError::SearchPath {
        variable: variable.to_string(),
        error: e.to_string(),
    })?;
    Ok(joined.to_string_lossy().into_owned())
}
