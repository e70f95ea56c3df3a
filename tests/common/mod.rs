//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// A temporary source root with package directories and fake tools.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Create one directory per package
    pub fn create_packages(&self, names: &[&str]) {
        for name in names {
            self.create_dir(name);
        }
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Write an executable shell script and return its path
    #[cfg(unix)]
    pub fn create_script(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.dir.path().join(name);
        self.create_file(name, &format!("#!/bin/sh\n{body}\n"));
        let mut perms = std::fs::metadata(&path)
            .expect("Failed to stat script")
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("Failed to make script executable");
        path
    }

    /// Fake build backend
    ///
    /// Appends `<package dir name> <args>` to `build.log` and fails with
    /// status 3 in the directory named by `$FAIL_PKG`.
    #[cfg(unix)]
    pub fn create_fake_backend(&self) -> PathBuf {
        let log = self.dir.path().join("build.log");
        self.create_script(
            "bin/fake-scons",
            &format!(
                r#"pkg=$(basename "$PWD")
echo "$pkg $*" >> "{}"
if [ "$pkg" = "$FAIL_PKG" ]; then exit 3; fi
exit 0"#,
                log.display()
            ),
        )
    }

    /// Fake test harness: runs the test and echoes its output
    #[cfg(unix)]
    pub fn create_fake_harness(&self) -> PathBuf {
        self.create_script("bin/fake-assay", r#"exec sh "$1""#)
    }

    /// Lines of the fake backend's log
    pub fn build_log(&self) -> Vec<String> {
        if !self.file_exists("build.log") {
            return Vec::new();
        }
        self.read_file("build.log")
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Run casabuild in `dir` with `args`
pub fn run_casabuild(dir: &Path, args: &[&str]) -> Output {
    casabuild_command(dir)
        .args(args)
        .output()
        .expect("Failed to execute casabuild")
}

/// casabuild command isolated from the user's environment
pub fn casabuild_command(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_casabuild"));
    cmd.current_dir(dir)
        .env("CASABUILD_CONFIG_DIR", dir.join(".casabuild-user"))
        .env_remove("CASABUILD_CONFIG")
        .env_remove("CASABUILD_BACKEND")
        .env_remove("CASABUILD_HARNESS")
        .env_remove("RUST_LOG");
    cmd
}

/// Small table used by several tests
pub const SMALL_TABLE: &str = r#"
[packages]
order = ["casa", "tables", "scimath", "measures"]

[packages.depends]
casa = []
tables = ["casa"]
scimath = ["casa"]
measures = ["tables", "scimath"]
"#;
