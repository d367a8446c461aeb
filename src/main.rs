//! CLI entry point for the slidegrab tool.

use std::process::ExitCode;

mod app;
mod app_config;
mod cli;

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Work completed, or only help/usage was requested.
    Success,
    /// Invalid arguments, failed download or failed merge.
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::from(1),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = match cli::parse_args_from(std::env::args_os()) {
        Ok(args) => args,
        Err(exit) => return exit.into(),
    };

    match app::runtime::run_slidegrab(args).await {
        Ok(exit) => exit.into(),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ProcessExit::Failure.into()
        }
    }
}
