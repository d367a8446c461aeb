//! Slidegrab Core Library
//!
//! This library provides the core functionality for the slidegrab tool,
//! which downloads a numbered sequence of slide images with an external
//! fetch tool and merges them into a single PDF with ImageMagick.
//!
//! # Architecture
//!
//! - [`batch`] - Task planning, process runner, batch coordinator and the
//!   aggregation step that follows a successful batch

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;

// Re-export commonly used types
pub use batch::{
    BatchConfig, BatchError, BatchResult, BatchState, BatchStats, BatchSummary, ConfigError,
    DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_DIR, Downloader, ProcessRunner, SystemRunner, Verbosity,
    run_batch,
};
