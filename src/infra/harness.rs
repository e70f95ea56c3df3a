//! Process-backed test harness
//!
//! Runs `<harness> ./<test>` from the test's own directory and captures its
//! output for classification.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use crate::core::assay::{TestHarness, TestOutput};
use crate::error::TestError;
use crate::infra::toolchain::Tool;

/// Test harness that spawns an external command per test executable
#[derive(Debug, Clone)]
pub struct CommandHarness {
    tool: Tool,
}

impl CommandHarness {
    /// Wrap a located harness tool
    pub fn new(tool: Tool) -> Self {
        Self { tool }
    }

    /// Locate `command`; `None` when it is not installed
    pub fn locate(command: &str) -> Option<Self> {
        Tool::locate(command).map(Self::new)
    }
}

impl TestHarness for CommandHarness {
    fn run_test(
        &self,
        executable: &Path,
        env: &BTreeMap<String, String>,
    ) -> Result<TestOutput, TestError> {
        let name = executable
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = executable.parent().unwrap_or_else(|| Path::new("."));

        let output = Command::new(self.tool.path())
            .arg(format!("./{name}"))
            .current_dir(dir)
            .envs(env)
            .output()
            .map_err(|e| TestError::Spawn {
                harness: self.tool.name().to_string(),
                test: name.clone(),
                error: e.to_string(),
            })?;

        Ok(TestOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Harness used when testing is disabled or the harness is missing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHarness;

impl TestHarness for NoHarness {
    fn run_test(
        &self,
        executable: &Path,
        _env: &BTreeMap<String, String>,
    ) -> Result<TestOutput, TestError> {
        Err(TestError::Spawn {
            harness: "none".to_string(),
            test: executable.display().to_string(),
            error: "no test harness available".to_string(),
        })
    }
}

/// Harness chosen at runtime
#[derive(Debug, Clone)]
pub enum Harness {
    /// External harness command
    Command(CommandHarness),
    /// Testing unavailable
    Disabled(NoHarness),
}

impl TestHarness for Harness {
    fn run_test(
        &self,
        executable: &Path,
        env: &BTreeMap<String, String>,
    ) -> Result<TestOutput, TestError> {
        match self {
            Self::Command(harness) => harness.run_test(executable, env),
            Self::Disabled(harness) => harness.run_test(executable, env),
        }
    }
}
