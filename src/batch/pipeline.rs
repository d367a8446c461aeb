//! End-to-end batch run: plan, download, then merge.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::aggregator::AggregatorTrigger;
use super::config::BatchConfig;
use super::coordinator::{BatchCoordinator, BatchResult, BatchStats, prepare_output_dir};
use super::planner::plan_tasks;
use super::runner::ProcessRunner;
use super::BatchError;

/// Result of a batch whose downloads all succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub result: BatchResult,
    /// The merged document; `None` when the batch had no pages.
    pub merged: Option<PathBuf>,
}

/// Runs one batch from configuration to merged document.
///
/// The output directory is created before any download starts. Aggregation
/// only runs once every download has exited with status 0; an empty page
/// range succeeds without downloading or merging anything.
///
/// # Errors
///
/// - [`BatchError::OutputDir`] when the output directory cannot be created
/// - [`BatchError::TaskFailure`] when any download failed (no merge attempted)
/// - [`BatchError::Aggregation`] when the merge step failed
#[instrument(skip_all, fields(output_dir = %config.output_dir().display()))]
pub async fn run_batch(
    config: &BatchConfig,
    runner: Arc<dyn ProcessRunner>,
    stats: Arc<BatchStats>,
) -> Result<BatchSummary, BatchError> {
    let tasks = plan_tasks(config);

    info!("Starting with page {}", config.start_page());
    info!("Capturing total number of pages: {}", config.end_page());
    debug!(
        url_pattern = config.url_pattern(),
        downloader = %config.downloader(),
        "map page numbers to the URL pattern"
    );

    prepare_output_dir(config.output_dir()).await?;

    let coordinator = BatchCoordinator::new(Arc::clone(&runner), config);
    let result = coordinator.run(tasks, stats).await?;

    if !result.succeeded() {
        let first = result.failed_task.clone().ok_or_else(|| {
            BatchError::Worker("batch failed without a recorded task failure".to_string())
        })?;
        return Err(BatchError::TaskFailure {
            first,
            failed: result.failed,
            total: result.total,
        });
    }

    if result.total == 0 {
        warn!(
            start_page = config.start_page(),
            end_page = config.end_page(),
            "page range is empty; nothing downloaded, skipping merge"
        );
        return Ok(BatchSummary {
            result,
            merged: None,
        });
    }

    let document = AggregatorTrigger::new(runner)
        .trigger(config.output_dir())
        .await?;

    info!("Done!");
    Ok(BatchSummary {
        result,
        merged: Some(document),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::batch::command::{CommandLine, MERGE_PROGRAM};
    use crate::batch::coordinator::BatchState;
    use crate::batch::runner::{ExitReport, OutputMode};
    use crate::batch::{AggregationError, RunnerError};

    /// Writes the destination file for downloads and counts merge invocations.
    struct SpyRunner {
        failing_url: Option<String>,
        merge_exit_code: i32,
        downloads: AtomicUsize,
        merges: AtomicUsize,
    }

    impl SpyRunner {
        fn new(failing_url: Option<&str>, merge_exit_code: i32) -> Arc<Self> {
            Arc::new(Self {
                failing_url: failing_url.map(str::to_string),
                merge_exit_code,
                downloads: AtomicUsize::new(0),
                merges: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ProcessRunner for SpyRunner {
        async fn run(
            &self,
            command: &CommandLine,
            _mode: OutputMode,
        ) -> Result<ExitReport, RunnerError> {
            if command.program() == MERGE_PROGRAM {
                self.merges.fetch_add(1, Ordering::SeqCst);
                return Ok(ExitReport::with_code(self.merge_exit_code));
            }
            self.downloads.fetch_add(1, Ordering::SeqCst);
            let args = command.arguments();
            let url = args[args.len() - 3].to_string_lossy();
            if self.failing_url.as_deref() == Some(&*url) {
                return Ok(ExitReport::with_code(22));
            }
            std::fs::write(Path::new(&args[args.len() - 1]), b"jpg").unwrap();
            Ok(ExitReport::with_code(0))
        }
    }

    fn config(dir: &Path, start: i64, end: i64) -> BatchConfig {
        BatchConfig::new(start, end, "https://h/s-[[[PAGE_NUM]]].jpg", dir.join("out")).unwrap()
    }

    #[tokio::test]
    async fn test_successful_batch_merges_exactly_once() {
        let temp = TempDir::new().unwrap();
        let config = config(temp.path(), 1, 3);
        let spy = SpyRunner::new(None, 0);

        let summary = run_batch(&config, spy.clone(), Arc::new(BatchStats::new()))
            .await
            .unwrap();

        assert_eq!(summary.result.state, BatchState::AllSucceeded);
        assert_eq!(summary.merged, Some(config.output_dir().join("slides.pdf")));
        assert_eq!(spy.downloads.load(Ordering::SeqCst), 3);
        assert_eq!(spy.merges.load(Ordering::SeqCst), 1);
        for name in ["01.jpg", "02.jpg", "03.jpg"] {
            assert!(config.output_dir().join(name).exists(), "{name} missing");
        }
    }

    #[tokio::test]
    async fn test_failed_download_never_triggers_merge() {
        let temp = TempDir::new().unwrap();
        let config = config(temp.path(), 1, 10);
        let spy = SpyRunner::new(Some("https://h/s-03.jpg"), 0);

        let err = run_batch(&config, spy.clone(), Arc::new(BatchStats::new()))
            .await
            .unwrap_err();

        match err {
            BatchError::TaskFailure {
                first,
                failed,
                total,
            } => {
                assert_eq!(first.page_number, 3);
                assert_eq!(first.exit_code, Some(22));
                assert_eq!(failed, 1);
                assert_eq!(total, 10);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(spy.downloads.load(Ordering::SeqCst), 10);
        assert_eq!(spy.merges.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_merge_failure_is_reported_and_pages_remain() {
        let temp = TempDir::new().unwrap();
        let config = config(temp.path(), 1, 2);
        let spy = SpyRunner::new(None, 1);

        let err = run_batch(&config, spy.clone(), Arc::new(BatchStats::new()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BatchError::Aggregation(AggregationError::Failed { exit_code: Some(1) })
        ));
        assert_eq!(err.triggering_exit_code(), Some(1));
        assert!(config.output_dir().join("01.jpg").exists());
        assert!(config.output_dir().join("02.jpg").exists());
    }

    #[tokio::test]
    async fn test_empty_range_succeeds_without_work() {
        let temp = TempDir::new().unwrap();
        let config = config(temp.path(), 5, 3);
        let spy = SpyRunner::new(None, 0);

        let summary = run_batch(&config, spy.clone(), Arc::new(BatchStats::new()))
            .await
            .unwrap();

        assert!(summary.result.succeeded());
        assert_eq!(summary.result.total, 0);
        assert!(summary.merged.is_none());
        assert_eq!(spy.downloads.load(Ordering::SeqCst), 0);
        assert_eq!(spy.merges.load(Ordering::SeqCst), 0);
        assert!(config.output_dir().is_dir());
    }
}
