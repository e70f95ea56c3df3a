//! Process-backed build backend
//!
//! Runs the build tool (SCons by default) inside a package directory with the
//! rendered arguments. Output goes straight to the terminal.

use std::path::Path;
use std::process::{Command, ExitStatus};

use tokio_util::sync::CancellationToken;

use crate::core::builder::{BackendStatus, BuildBackend};
use crate::error::BuildError;
use crate::infra::toolchain::Tool;

/// Signal number of SIGINT
#[cfg(unix)]
const SIGINT: i32 = 2;

/// Build backend that spawns an external command per package
#[derive(Debug, Clone)]
pub struct CommandBackend {
    tool: Tool,
    cancel: CancellationToken,
}

impl CommandBackend {
    /// Locate `command` and wrap it as a backend
    pub fn locate(command: &str) -> Result<Self, BuildError> {
        let tool = Tool::locate(command).ok_or_else(|| BuildError::ToolNotFound {
            tool: command.to_string(),
        })?;
        Ok(Self::new(tool))
    }

    /// Backend for an already located tool
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            cancel: CancellationToken::new(),
        }
    }

    /// Treat failures after `token` is cancelled as interruptions
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    fn classify(&self, status: ExitStatus) -> BackendStatus {
        if status.success() {
            BackendStatus::Success
        } else if killed_by_interrupt(&status) || self.cancel.is_cancelled() {
            BackendStatus::Interrupted
        } else {
            BackendStatus::Failed(status.code().unwrap_or(1))
        }
    }
}

impl BuildBackend for CommandBackend {
    fn build(
        &self,
        package: &str,
        dir: &Path,
        args: &[String],
    ) -> Result<BackendStatus, BuildError> {
        if !dir.is_dir() {
            return Err(BuildError::PackageDirNotFound {
                path: dir.to_path_buf(),
            });
        }

        tracing::debug!(
            "Running {} {} in {}",
            self.tool.name(),
            args.join(" "),
            dir.display()
        );

        let status = Command::new(self.tool.path())
            .args(args)
            .current_dir(dir)
            .status()
            .map_err(|e| BuildError::Spawn {
                tool: self.tool.name().to_string(),
                package: package.to_string(),
                error: e.to_string(),
            })?;

        Ok(self.classify(status))
    }
}

#[cfg(unix)]
fn killed_by_interrupt(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(SIGINT)
}

#[cfg(not(unix))]
fn killed_by_interrupt(_status: &ExitStatus) -> bool {
    false
}
