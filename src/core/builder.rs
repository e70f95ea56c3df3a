//! Build orchestration logic
//!
//! Walks a [`BuildPlan`] in order, invoking the build backend once per
//! package. The first failed or interrupted build ends the run; tests are
//! triggered after each successful build when configured. An interrupt while
//! a package's tests run ends the run once the current test returns.

use std::path::Path;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::core::assay::{TestHarness, TestReport, TestTrigger};
use crate::core::build_env::ExecutionContext;
use crate::core::plan::BuildPlan;
use crate::error::BuildError;

/// Result of one backend invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    /// Package built and installed
    Success,
    /// Backend reported failure with this exit status
    Failed(i32),
    /// Backend was interrupted by the user
    Interrupted,
}

/// Builds and installs a single package
pub trait BuildBackend {
    /// Build `package` from `dir` with `args`
    fn build(
        &self,
        package: &str,
        dir: &Path,
        args: &[String],
    ) -> Result<BackendStatus, BuildError>;
}

/// Observer for build progress
pub trait BuildReporter {
    /// A package is about to be built (`index` is zero-based)
    fn package_started(&self, _index: usize, _total: usize, _package: &str) {}

    /// A package built successfully
    fn package_built(&self, _package: &str) {}

    /// Tests for a package finished
    fn tests_finished(&self, _report: &TestReport) {}
}

/// Reporter that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl BuildReporter for SilentReporter {}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    /// Packages built, in order
    pub built: Vec<String>,
    /// Test reports, in build order
    pub tests: Vec<TestReport>,
}

impl BuildSummary {
    /// Total passed tests
    pub fn tests_passed(&self) -> usize {
        self.tests.iter().map(TestReport::passed).sum()
    }

    /// Total failed tests
    pub fn tests_failed(&self) -> usize {
        self.tests.iter().map(TestReport::failed).sum()
    }
}

/// Build orchestrator state
#[derive(Debug)]
pub struct BuildOrchestrator<B, H> {
    /// Backend invoked per package
    backend: B,
    /// Harness used by the test trigger
    harness: H,
    /// Source root and inherited search paths
    context: ExecutionContext,
    /// Rendered backend arguments
    args: Vec<String>,
    /// Present when tests should run after each build
    tests: Option<TestTrigger>,
    /// Cancelled when the user interrupts the run
    cancel: CancellationToken,
}

impl<B: BuildBackend, H: TestHarness> BuildOrchestrator<B, H> {
    /// Create a new build orchestrator
    pub fn new(backend: B, harness: H, context: ExecutionContext) -> Self {
        Self {
            backend,
            harness,
            context,
            args: Vec::new(),
            tests: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Set the backend arguments
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Run tests after each successful build
    #[must_use]
    pub fn with_tests(mut self, trigger: Option<TestTrigger>) -> Self {
        self.tests = trigger;
        self
    }

    /// Stop the run once `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Build every package in `plan`
    ///
    /// Stops at the first failed or interrupted build. Test failures are
    /// reported but never stop the run; an interrupt during testing does.
    pub fn run(
        &self,
        plan: &BuildPlan,
        reporter: &dyn BuildReporter,
    ) -> Result<BuildSummary, BuildError> {
        let mut summary = BuildSummary::default();
        let total = plan.len();

        for (index, package) in plan.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(BuildError::Interrupted {
                    package: package.clone(),
                });
            }

            reporter.package_started(index, total, package);
            let dir = self.context.package_dir(package);
            tracing::info!("Building package: {package}");
            tracing::debug!("Backend arguments for {package}: {:?}", self.args);

            match self.backend.build(package, &dir, &self.args)? {
                BackendStatus::Success => {}
                BackendStatus::Failed(status) => {
                    tracing::error!("Build failed for {package} with status {status}");
                    return Err(BuildError::BuildFailed {
                        package: package.clone(),
                        status,
                    });
                }
                BackendStatus::Interrupted => {
                    return Err(BuildError::Interrupted {
                        package: package.clone(),
                    });
                }
            }

            summary.built.push(package.clone());
            reporter.package_built(package);

            if let Some(trigger) = &self.tests {
                tracing::info!("Testing package: {package}");
                match trigger.run(&self.harness, &self.context, package, &self.cancel) {
                    Ok(report) => {
                        reporter.tests_finished(&report);
                        summary.tests.push(report);
                    }
                    Err(e) => tracing::warn!("Could not run tests for {package}: {e}"),
                }

                if self.cancel.is_cancelled() {
                    return Err(BuildError::Interrupted {
                        package: package.clone(),
                    });
                }
            }
        }

        Ok(summary)
    }
}
