//! Batch coordinator: runs every download task through a bounded worker pool
//! and waits for all of them before reporting.
//!
//! # Concurrency Model
//!
//! - All tasks are queued on a channel up front; the sender is then dropped
//! - `min(concurrency, tasks)` workers pull from the shared receiver
//! - Each worker sends one [`TaskReport`] per task on a results channel
//! - The coordinator drains the results channel until every worker has
//!   exited, which is the barrier: a failing task never short-circuits the rest
//!
//! # State
//!
//! A batch is `Running` while reports arrive and ends in exactly one of
//! `AllSucceeded` or `AnyFailed`.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};

use super::command::download_command;
use super::config::{BatchConfig, Downloader, Verbosity};
use super::error::describe_exit;
use super::planner::DownloadTask;
use super::runner::{ExitReport, OutputMode, ProcessRunner};
use super::{BatchError, TaskFailure};

/// Live counters for a running batch.
///
/// Shared with progress displays; updated by the coordinator as reports arrive.
#[derive(Debug, Default)]
pub struct BatchStats {
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl BatchStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of downloads that exited with status 0.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Returns the number of downloads that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Returns the number of tasks that reached a terminal state.
    #[must_use]
    pub fn finished(&self) -> usize {
        self.completed() + self.failed()
    }

    fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Phase of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// Tasks are still being awaited.
    Running,
    /// Every task exited with status 0 (vacuously true for an empty batch).
    AllSucceeded,
    /// At least one task failed.
    AnyFailed,
}

/// How a single task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The process ran and exited.
    Exited(ExitReport),
    /// The process could not be started or awaited.
    RunnerFailed(String),
}

/// One task's terminal state as sent by a worker.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub task: DownloadTask,
    pub outcome: TaskOutcome,
}

impl TaskReport {
    fn failure(&self) -> Option<TaskFailure> {
        let (exit_code, reason) = match &self.outcome {
            TaskOutcome::Exited(report) if report.success() => return None,
            TaskOutcome::Exited(report) => (report.code, describe_exit(&report.code)),
            TaskOutcome::RunnerFailed(message) => (None, message.clone()),
        };
        Some(TaskFailure {
            page_number: self.task.page_number,
            source_url: self.task.source_url.clone(),
            exit_code,
            reason,
        })
    }
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub state: BatchState,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    /// First failure received by the coordinator.
    pub failed_task: Option<TaskFailure>,
}

impl BatchResult {
    /// True only when every task exited with status 0.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.state == BatchState::AllSucceeded
    }
}

/// Accumulates reports while a batch is `Running`.
#[derive(Debug)]
struct BatchProgress {
    state: BatchState,
    total: usize,
    completed: usize,
    failed: usize,
    first_failure: Option<TaskFailure>,
}

impl BatchProgress {
    fn new(total: usize) -> Self {
        Self {
            state: BatchState::Running,
            total,
            completed: 0,
            failed: 0,
            first_failure: None,
        }
    }

    fn record(&mut self, report: &TaskReport, stats: &BatchStats) {
        debug_assert_eq!(self.state, BatchState::Running);
        match report.failure() {
            None => {
                self.completed += 1;
                stats.increment_completed();
                debug!(
                    page = report.task.page_number,
                    path = %report.task.destination.display(),
                    "page downloaded"
                );
            }
            Some(failure) => {
                self.failed += 1;
                stats.increment_failed();
                warn!(
                    page = failure.page_number,
                    url = %failure.source_url,
                    exit_code = ?failure.exit_code,
                    reason = %failure.reason,
                    "page download failed"
                );
                self.first_failure.get_or_insert(failure);
            }
        }
    }

    fn finish(mut self) -> BatchResult {
        self.state = if self.failed == 0 {
            BatchState::AllSucceeded
        } else {
            BatchState::AnyFailed
        };
        BatchResult {
            state: self.state,
            total: self.total,
            completed: self.completed,
            failed: self.failed,
            failed_task: self.first_failure,
        }
    }
}

/// Creates the output directory once, before any task is launched.
///
/// # Errors
///
/// Returns [`BatchError::OutputDir`] when the directory cannot be created.
pub async fn prepare_output_dir(dir: &Path) -> Result<(), BatchError> {
    if tokio::fs::metadata(dir).await.is_ok_and(|m| m.is_dir()) {
        return Ok(());
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| BatchError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })?;
    info!(dir = %dir.display(), "Created output directory");
    Ok(())
}

/// Drives a set of download tasks to completion.
pub struct BatchCoordinator {
    runner: Arc<dyn ProcessRunner>,
    concurrency: usize,
    downloader: Downloader,
    verbosity: Verbosity,
}

impl std::fmt::Debug for BatchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchCoordinator")
            .field("concurrency", &self.concurrency)
            .field("downloader", &self.downloader)
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

impl BatchCoordinator {
    /// Creates a coordinator using the pool size and tool choice from `config`.
    #[must_use]
    pub fn new(runner: Arc<dyn ProcessRunner>, config: &BatchConfig) -> Self {
        Self {
            runner,
            concurrency: config.concurrency(),
            downloader: config.downloader(),
            verbosity: config.verbosity(),
        }
    }

    /// Runs every task and waits for all of them to terminate.
    ///
    /// Individual download failures do NOT make this method error; they are
    /// counted in the returned [`BatchResult`].
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Worker`] if a worker panicked.
    #[instrument(skip(self, tasks, stats), fields(tasks = tasks.len(), concurrency = self.concurrency))]
    pub async fn run(
        &self,
        tasks: Vec<DownloadTask>,
        stats: Arc<BatchStats>,
    ) -> Result<BatchResult, BatchError> {
        let mut progress = BatchProgress::new(tasks.len());
        if tasks.is_empty() {
            debug!("empty batch, nothing to launch");
            return Ok(progress.finish());
        }

        let worker_count = self.concurrency.min(tasks.len());
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        for task in tasks {
            // Receiver is alive until the workers below are spawned.
            let _ = task_tx.send(task);
        }
        drop(task_tx);
        let task_rx = Arc::new(Mutex::new(task_rx));

        let (report_tx, mut report_rx) = mpsc::unbounded_channel();
        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            handles.push(tokio::spawn(worker_loop(
                worker_id,
                Arc::clone(&task_rx),
                report_tx.clone(),
                Arc::clone(&self.runner),
                self.downloader,
                self.verbosity,
            )));
        }
        drop(report_tx);

        debug!(workers = worker_count, "waiting for downloads to complete");

        while let Some(report) = report_rx.recv().await {
            progress.record(&report, &stats);
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| BatchError::Worker(e.to_string()))?;
        }

        let result = progress.finish();
        info!(
            completed = result.completed,
            failed = result.failed,
            total = result.total,
            "batch finished"
        );
        Ok(result)
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<DownloadTask>>>,
    reports: mpsc::UnboundedSender<TaskReport>,
    runner: Arc<dyn ProcessRunner>,
    downloader: Downloader,
    verbosity: Verbosity,
) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(task) = next else {
            break;
        };

        let command = download_command(downloader, verbosity, &task);
        debug!(worker_id, page = task.page_number, %command, "execute command");

        let outcome = match runner.run(&command, OutputMode::Quiet(verbosity)).await {
            Ok(report) => TaskOutcome::Exited(report),
            Err(e) => TaskOutcome::RunnerFailed(e.to_string()),
        };

        if reports.send(TaskReport { task, outcome }).is_err() {
            break;
        }
    }
}
