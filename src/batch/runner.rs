//! Runs one external command to completion.
//!
//! [`ProcessRunner`] is the seam between the batch logic and the OS: the
//! coordinator and the aggregation step only see exit reports, so tests can
//! swap in a scripted runner.

use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument, trace};

use super::RunnerError;
use super::command::CommandLine;
use super::config::Verbosity;

/// Where a subprocess's output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// stdout and stderr are connected to the controlling terminal.
    Stream,
    /// stdout is discarded; stderr is shown only at `Verbosity::Trace`.
    Quiet(Verbosity),
}

impl OutputMode {
    fn stdout(self) -> Stdio {
        match self {
            Self::Stream => Stdio::inherit(),
            Self::Quiet(_) => Stdio::null(),
        }
    }

    fn shows_stderr(self) -> bool {
        matches!(self, Self::Stream | Self::Quiet(Verbosity::Trace))
    }

    fn stderr(self) -> Stdio {
        if self.shows_stderr() {
            Stdio::inherit()
        } else {
            Stdio::null()
        }
    }
}

/// Terminal state of a finished process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ExitReport {
    /// Report for a process that exited with `code`.
    #[must_use]
    pub fn with_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// True only for exit code 0.
    #[must_use]
    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ExitReport {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Executes external commands.
///
/// Implementations report the exit code without interpreting it; a non-zero
/// code is not an `Err`.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `command` to completion.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the process cannot be started or awaited.
    async fn run(&self, command: &CommandLine, mode: OutputMode)
    -> Result<ExitReport, RunnerError>;
}

/// Runs commands as real OS processes via `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    #[instrument(level = "debug", skip(self, command), fields(program = command.program()))]
    async fn run(
        &self,
        command: &CommandLine,
        mode: OutputMode,
    ) -> Result<ExitReport, RunnerError> {
        debug!(%command, ?mode, "execute command");

        let mut child = Command::new(command.program())
            .args(command.arguments())
            .stdin(Stdio::null())
            .stdout(mode.stdout())
            .stderr(mode.stderr())
            .kill_on_drop(false)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: command.program().to_string(),
                source,
            })?;

        let status = child.wait().await.map_err(|source| RunnerError::Wait {
            program: command.program().to_string(),
            source,
        })?;

        let report = ExitReport::from(status);
        trace!(code = ?report.code, "command finished");
        Ok(report)
    }
}
