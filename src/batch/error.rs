//! Error types for the batch module.
//!
//! Each failure kind keeps the context an operator needs to act on it: the
//! offending value for configuration problems, the page and exit code for a
//! failed download, the exit code for a failed merge.

use std::path::PathBuf;

use thiserror::Error;

use super::config::{MAX_CONCURRENCY, MAX_PAGE_NUMBER, MIN_CONCURRENCY, PAGE_PLACEHOLDER};

/// Invalid or missing configuration. No task is launched when this is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The last page number is missing or below 1.
    #[error("NUM_PAGES must be greater than 0 (got {value})")]
    InvalidPageCount {
        /// The rejected value.
        value: i64,
    },

    /// The last page number is above [`MAX_PAGE_NUMBER`].
    #[error("NUM_PAGES must be at most {MAX_PAGE_NUMBER} (got {value})")]
    PageCountTooLarge {
        /// The rejected value.
        value: i64,
    },

    /// The first page number is below 1.
    #[error("START_PAGE must be greater than 0 (got {value})")]
    InvalidStartPage {
        /// The rejected value.
        value: i64,
    },

    /// The URL pattern has nothing to substitute the page number into.
    #[error("URL pattern must contain the {PAGE_PLACEHOLDER} placeholder: {pattern}")]
    MissingPlaceholder {
        /// The pattern as given.
        pattern: String,
    },

    /// Worker pool size outside the supported range.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The rejected value.
        value: usize,
    },
}

/// Failure to drive an external process to completion.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The program could not be started at all (missing binary, permissions).
    #[error("failed to execute {program}: {source}")]
    Spawn {
        /// Program name as passed to the OS.
        program: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The process started but waiting on it failed.
    #[error("failed waiting for {program}: {source}")]
    Wait {
        /// Program name as passed to the OS.
        program: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Failure of the single merge step that follows a successful batch.
#[derive(Debug, Error)]
pub enum AggregationError {
    /// The glob over the output directory matched no image.
    #[error("no .jpg files to merge in {dir}")]
    NoInputs {
        /// Directory that was scanned.
        dir: PathBuf,
    },

    /// The glob pattern could not be built from the output directory path.
    #[error("invalid glob pattern {pattern}: {source}")]
    Pattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying glob error.
        #[source]
        source: glob::PatternError,
    },

    /// The merge tool could not be started.
    #[error(transparent)]
    Runner(#[from] RunnerError),

    /// The merge tool ran and exited non-zero (or was killed).
    #[error("merge command exited with {}", describe_exit(.exit_code))]
    Failed {
        /// Exit code, absent when terminated by a signal.
        exit_code: Option<i32>,
    },
}

/// A download task that did not finish with exit status 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// Page number of the failed task.
    pub page_number: u32,
    /// Source URL of the failed task.
    pub source_url: String,
    /// Exit code, absent when the process was killed or never started.
    pub exit_code: Option<i32>,
    /// Human-readable reason (exit status or spawn error).
    pub reason: String,
}

/// Top-level error for a batch run.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Configuration was rejected before any work started.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// At least one download failed; aggregation was skipped.
    #[error(
        "download of page {} failed ({}); {failed} of {total} task(s) failed",
        .first.page_number,
        .first.reason
    )]
    TaskFailure {
        /// First failure observed by the coordinator.
        first: TaskFailure,
        /// Number of failed tasks.
        failed: usize,
        /// Number of tasks in the batch.
        total: usize,
    },

    /// All downloads succeeded but the merge step did not.
    #[error("aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    /// A worker task panicked or was cancelled.
    #[error("batch worker terminated abnormally: {0}")]
    Worker(String),
}

impl BatchError {
    /// Exit code of the external process that triggered this error, if any.
    #[must_use]
    pub fn triggering_exit_code(&self) -> Option<i32> {
        match self {
            Self::TaskFailure { first, .. } => first.exit_code,
            Self::Aggregation(AggregationError::Failed { exit_code }) => *exit_code,
            _ => None,
        }
    }
}

/// Renders an optional exit code for messages.
#[allow(clippy::ref_option)]
pub(crate) fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
