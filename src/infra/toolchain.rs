//! External tool lookup
//!
//! Resolves the build backend and test harness commands to executables.

use std::path::{Path, PathBuf};

/// An external command resolved on `PATH`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    /// Name as configured (e.g. "scons")
    name: String,
    /// Resolved executable path
    path: PathBuf,
}

impl Tool {
    /// Locate `name` on `PATH` (or as a path to an executable)
    pub fn locate(name: &str) -> Option<Self> {
        match which::which(name) {
            Ok(path) => {
                tracing::debug!("Found {name} at {}", path.display());
                Some(Self {
                    name: name.to_string(),
                    path,
                })
            }
            Err(e) => {
                tracing::debug!("{name} not found: {e}");
                None
            }
        }
    }

    /// Configured name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved executable path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
