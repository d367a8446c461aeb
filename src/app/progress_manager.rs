//! Progress UI (spinner) for batch runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use slidegrab_core::BatchStats;

/// Spawns the progress UI (spinner) when requested.
/// Returns (handle, stop) so the caller can signal stop and await the handle.
/// When `use_spinner` is false, returns (None, stop) with stop already true.
pub(crate) fn spawn_progress_ui(
    use_spinner: bool,
    stats: Arc<BatchStats>,
    total: usize,
) -> (Option<tokio::task::JoinHandle<()>>, Arc<AtomicBool>) {
    if !use_spinner || total == 0 {
        return (None, Arc::new(AtomicBool::new(true)));
    }
    let stop = Arc::new(AtomicBool::new(false));
    let handle = spawn_spinner_inner(stats, total, Arc::clone(&stop));
    (Some(handle), stop)
}

fn spawn_spinner_inner(
    stats: Arc<BatchStats>,
    total: usize,
    stop: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));

        // Clears once every download is terminal so merge output is not overdrawn.
        while !stop.load(Ordering::SeqCst) && stats.finished() < total {
            spinner.set_message(progress_message(&stats, total));
            tokio::time::sleep(Duration::from_millis(120)).await;
        }

        spinner.finish_and_clear();
    })
}

fn progress_message(stats: &BatchStats, total: usize) -> String {
    let failed = stats.failed();
    let done = stats.finished().min(total);
    if failed == 0 {
        format!("[{done}/{total}] Downloading slides...")
    } else {
        format!("[{done}/{total}] Downloading slides... ({failed} failed)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawn_progress_ui_when_disabled_returns_none_handle_and_stop_already_true() {
        let (handle, stop) = spawn_progress_ui(false, Arc::new(BatchStats::new()), 3);

        assert!(handle.is_none());
        assert!(
            stop.load(Ordering::SeqCst),
            "stop signal should be true when spinner disabled"
        );
    }

    #[tokio::test]
    async fn spawn_progress_ui_skips_empty_batches() {
        let (handle, stop) = spawn_progress_ui(true, Arc::new(BatchStats::new()), 0);
        assert!(handle.is_none());
        assert!(stop.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn spawn_progress_ui_when_enabled_returns_handle_and_stop_ends_task() {
        let (handle, stop) = spawn_progress_ui(true, Arc::new(BatchStats::new()), 1);

        assert!(
            handle.is_some(),
            "handle should be Some when spinner enabled"
        );
        assert!(
            !stop.load(Ordering::SeqCst),
            "stop should be false initially"
        );

        stop.store(true, Ordering::SeqCst);
        let join_handle = handle.unwrap();
        let _ = join_handle.await;
        // If we get here without hanging, the spinner task exited on stop signal
    }

    #[test]
    fn progress_message_starts_at_zero() {
        let stats = BatchStats::new();
        assert_eq!(progress_message(&stats, 4), "[0/4] Downloading slides...");
    }
}
