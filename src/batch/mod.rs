//! Concurrent batch download of numbered slide images.
//!
//! This module expands a page range and URL pattern into download tasks, runs
//! them as external processes through a bounded worker pool, and merges the
//! results into one document once every download has succeeded.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use slidegrab_core::batch::{BatchConfig, BatchStats, SystemRunner, run_batch};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BatchConfig::new(
//!     1,
//!     47,
//!     "https://image.example.com/deck-[[[PAGE_NUM]]]-638.jpg",
//!     "slideshare-output",
//! )?;
//! let summary = run_batch(&config, Arc::new(SystemRunner::new()), Arc::new(BatchStats::new())).await?;
//! println!("Merged: {:?}", summary.merged);
//! # Ok(())
//! # }
//! ```

mod aggregator;
mod command;
mod config;
mod coordinator;
mod error;
mod pipeline;
mod planner;
mod runner;

pub use aggregator::{AggregatorTrigger, collect_inputs};
pub use command::{
    CommandLine, MERGE_PROGRAM, MERGED_DOCUMENT, download_command, merge_command,
    merged_document_path,
};
pub use config::{
    BatchConfig, DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_DIR, Downloader, MAX_CONCURRENCY,
    MAX_PAGE_NUMBER, MIN_CONCURRENCY, PAGE_PLACEHOLDER, Verbosity,
};
pub use coordinator::{
    BatchCoordinator, BatchResult, BatchState, BatchStats, TaskOutcome, TaskReport,
    prepare_output_dir,
};
pub use error::{AggregationError, BatchError, ConfigError, RunnerError, TaskFailure};
pub use pipeline::{BatchSummary, run_batch};
pub use planner::{DownloadTask, PAGE_EXTENSION, expand_pattern, format_page_token, plan_tasks};
pub use runner::{ExitReport, OutputMode, ProcessRunner, SystemRunner};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, BatchError>` explicitly in function signatures.
