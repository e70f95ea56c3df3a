//! Build command implementation
//!
//! Builds every package of the plan with the configured backend, then runs
//! the unit tests of each package when requested.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use super::Session;
use crate::cli::output::{summary_lines, ConsoleReporter, OutputConfig};
use crate::core::args::BuildConfig;
use crate::core::assay::TestTrigger;
use crate::core::build_env::ExecutionContext;
use crate::core::builder::{BuildOrchestrator, BuildSummary};
use crate::core::settings::Settings;
use crate::infra::backend::CommandBackend;
use crate::infra::filesystem::ensure_stage_dir;
use crate::infra::harness::{CommandHarness, Harness, NoHarness};

/// Tool overrides from the command line
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Build backend command
    pub backend: Option<String>,
    /// Test harness command
    pub harness: Option<String>,
}

/// Execute the build
pub async fn execute(
    session: Session,
    options: BuildOptions,
    output: OutputConfig,
) -> Result<BuildSummary> {
    let Session {
        source_root,
        settings,
        config,
        plan,
        ..
    } = session;

    if let Some(stage) = config.install().stage_dir() {
        ensure_stage_dir(stage).context("Failed to prepare staging directory")?;
    }

    let backend_cmd = options
        .backend
        .unwrap_or_else(|| settings.backend().to_string());
    let cancel = CancellationToken::new();
    let backend = CommandBackend::locate(&backend_cmd)?.with_cancellation(cancel.clone());

    let (harness, tests) = select_tests(&config, &settings, options.harness.as_deref());

    let context = ExecutionContext::from_process(&source_root).with_tests_dir(settings.tests_dir());
    let orchestrator = BuildOrchestrator::new(backend, harness, context)
        .with_args(config.backend_args())
        .with_tests(tests)
        .with_cancellation(cancel.clone());

    tracing::info!(
        "Building {} packages from {}",
        plan.len(),
        source_root.display()
    );

    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("Interrupt received");
                cancel.cancel();
            }
        }
    });

    let result = tokio::task::spawn_blocking(move || {
        let reporter = ConsoleReporter::new(plan.len(), &output);
        let result = orchestrator.run(&plan, &reporter);
        reporter.finish();
        result
    })
    .await
    .context("Build task failed")?;

    watcher.abort();
    let summary = result?;

    if output.json {
        let out = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{out}");
    } else if !output.quiet {
        for line in summary_lines(&summary) {
            println!("{line}");
        }
    }

    Ok(summary)
}

/// Pick the harness and test trigger for this run
///
/// Testing needs a known install prefix and an installed harness; when
/// either is missing the build goes ahead without tests.
fn select_tests(
    config: &BuildConfig,
    settings: &Settings,
    harness_override: Option<&str>,
) -> (Harness, Option<TestTrigger>) {
    let disabled = (Harness::Disabled(NoHarness), None);

    if !config.tests_requested() {
        return disabled;
    }

    let Some(prefix) = config.test_prefix() else {
        tracing::warn!("Tests requested but no install prefix is known; skipping tests");
        return disabled;
    };

    let harness_cmd = harness_override.unwrap_or_else(|| settings.harness());
    match CommandHarness::locate(harness_cmd) {
        Some(harness) => (Harness::Command(harness), Some(settings.test_trigger(prefix))),
        None => {
            tracing::warn!("Test harness '{harness_cmd}' not found; skipping tests");
            disabled
        }
    }
}
