//! Unit-test triggering
//!
//! After a package is built and installed, its test executables are run one
//! at a time through the assay harness. Results are collected into a
//! [`TestReport`]; a failing test never stops the build.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::defaults::{DEFAULT_DATA_PATH_VAR, DEFAULT_PASS_MARKERS, DEFAULT_TEST_PREFIX};
use crate::core::build_env::ExecutionContext;
use crate::error::TestError;

/// Captured harness output for one test executable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

/// Runs one test executable
pub trait TestHarness {
    /// Run `executable` with `env` applied on top of the inherited environment
    fn run_test(
        &self,
        executable: &Path,
        env: &BTreeMap<String, String>,
    ) -> Result<TestOutput, TestError>;
}

/// Outcome of a single test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Harness output contained a pass marker
    Passed,
    /// Anything else
    Failed,
}

/// Result of a single test executable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    /// Executable name
    pub name: String,
    /// Outcome
    pub status: TestStatus,
    /// Harness output (stdout then stderr), trimmed
    pub output: String,
}

/// Test results for one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestReport {
    /// Package the tests belong to
    pub package: String,
    /// Per-test results in execution order
    pub results: Vec<TestResult>,
}

impl TestReport {
    /// Empty report for `package`
    pub fn new(package: &str) -> Self {
        Self {
            package: package.to_string(),
            results: Vec::new(),
        }
    }

    /// Number of passed tests
    pub fn passed(&self) -> usize {
        self.count(TestStatus::Passed)
    }

    /// Number of failed tests
    pub fn failed(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    /// Whether no test failed
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

/// Runs a package's tests against an install prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTrigger {
    /// Install prefix the tests link against
    prefix: PathBuf,
    /// Name prefix of test executables
    executable_prefix: String,
    /// Output markers meaning "passed"
    pass_markers: Vec<String>,
    /// Variable pointing tests at their data directory
    data_path_var: String,
}

impl TestTrigger {
    /// Trigger with the default discovery and classification rules
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            executable_prefix: DEFAULT_TEST_PREFIX.to_string(),
            pass_markers: DEFAULT_PASS_MARKERS.iter().map(|m| (*m).to_string()).collect(),
            data_path_var: DEFAULT_DATA_PATH_VAR.to_string(),
        }
    }

    /// Set the test executable name prefix
    #[must_use]
    pub fn with_executable_prefix(mut self, prefix: &str) -> Self {
        self.executable_prefix = prefix.to_string();
        self
    }

    /// Set the pass markers
    #[must_use]
    pub fn with_pass_markers(mut self, markers: Vec<String>) -> Self {
        self.pass_markers = markers;
        self
    }

    /// Set the data path variable
    #[must_use]
    pub fn with_data_path_var(mut self, var: &str) -> Self {
        self.data_path_var = var.to_string();
        self
    }

    /// Install prefix
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Run every test executable of `package`
    ///
    /// A package without a test directory yields an empty report. A test whose
    /// harness cannot be started is recorded as failed. Once `cancel` fires no
    /// further test is started and the partial report is returned.
    pub fn run<H: TestHarness + ?Sized>(
        &self,
        harness: &H,
        context: &ExecutionContext,
        package: &str,
        cancel: &CancellationToken,
    ) -> Result<TestReport, TestError> {
        let test_dir = context.test_dir(package);
        let mut report = TestReport::new(package);

        if !test_dir.is_dir() {
            tracing::debug!("No test directory for {package} at {}", test_dir.display());
            return Ok(report);
        }

        let env = context.test_env(&self.prefix, &test_dir, &self.data_path_var)?;
        let tests = discover_tests(&test_dir, &self.executable_prefix)?;
        tracing::info!("Running {} tests for {package}", tests.len());

        for test in tests {
            if cancel.is_cancelled() {
                tracing::warn!("Tests for {package} interrupted");
                break;
            }

            let name = test
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let result = match harness.run_test(&test, &env) {
                Ok(output) => {
                    let combined = combine_output(&output);
                    TestResult {
                        name,
                        status: classify(&combined, &self.pass_markers),
                        output: combined,
                    }
                }
                Err(e) => {
                    tracing::warn!("{e}");
                    TestResult {
                        name,
                        status: TestStatus::Failed,
                        output: e.to_string(),
                    }
                }
            };

            tracing::debug!("{}: {:?}", result.name, result.status);
            report.results.push(result);
        }

        Ok(report)
    }
}

/// File names ending in `.<word>` are sources or data, not test executables
const EXTENSION_PATTERN: &str = r"\.\w+$";

/// Classify harness output: any pass marker means the test passed
pub fn classify(output: &str, pass_markers: &[String]) -> TestStatus {
    if pass_markers.iter().any(|m| !m.is_empty() && output.contains(m.as_str())) {
        TestStatus::Passed
    } else {
        TestStatus::Failed
    }
}

/// Find test executables directly inside `dir`
///
/// Candidates are files whose name starts with `prefix` and carries no
/// extension. Results are sorted by name.
pub fn discover_tests(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, TestError> {
    let extension = Regex::new(EXTENSION_PATTERN).map_err(|e| TestError::InvalidPattern {
        pattern: EXTENSION_PATTERN.to_string(),
        error: e.to_string(),
    })?;
    let mut tests = Vec::new();

    for entry in walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| TestError::ReadDir {
            path: dir.to_path_buf(),
            error: e.to_string(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let is_test = {
            let name = entry.file_name().to_string_lossy();
            name.starts_with(prefix) && !extension.is_match(&name)
        };
        if is_test {
            tests.push(entry.into_path());
        }
    }

    Ok(tests)
}

fn combine_output(output: &TestOutput) -> String {
    let stdout = output.stdout.trim();
    let stderr = output.stderr.trim();
    match (stdout.is_empty(), stderr.is_empty()) {
        (false, false) => format!("{stdout}\n{stderr}"),
        (false, true) => stdout.to_string(),
        _ => stderr.to_string(),
    }
}
