use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::Result;
use slidegrab_core::{BatchStats, SystemRunner, run_batch};
use tracing::{debug, info};

use crate::app::{config_manager, exit_handler, progress_manager, terminal};
use crate::app_config::load_default_file_config;
use crate::cli::{self, Args};
use crate::ProcessExit;

pub(crate) async fn run_slidegrab(args: Args) -> Result<ProcessExit> {
    let file_config = load_default_file_config()?;

    let resolved = match config_manager::resolve_config(&args, file_config.as_ref()) {
        Ok(resolved) => resolved,
        Err(err) => {
            eprintln!("{err}\n\n{}", cli::usage());
            return Ok(ProcessExit::Failure);
        }
    };
    let config = resolved.batch;

    terminal::init_tracing(
        config.verbosity().log_level(),
        resolved.verbosity_from_cli,
        terminal::is_no_color_requested(),
    );

    debug!(?args, "CLI arguments parsed");
    debug!(
        verbosity = config.verbosity().as_str(),
        concurrency = config.concurrency(),
        from_file = file_config.is_some(),
        "configuration resolved"
    );

    let stats = Arc::new(BatchStats::new());
    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        config.verbosity(),
        terminal::is_dumb_terminal(),
    );
    let (progress_handle, progress_stop) =
        progress_manager::spawn_progress_ui(use_spinner, Arc::clone(&stats), config.page_count());

    let outcome = run_batch(&config, Arc::new(SystemRunner::new()), Arc::clone(&stats)).await;

    progress_stop.store(true, Ordering::SeqCst);
    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    match &outcome {
        Ok(summary) => {
            if let Some(document) = &summary.merged {
                info!(
                    pages = summary.result.completed,
                    document = %document.display(),
                    "Slides merged"
                );
            }
        }
        Err(err) => eprintln!("{}", exit_handler::failure_message(err)),
    }

    Ok(exit_handler::determine_exit_outcome(&outcome))
}
