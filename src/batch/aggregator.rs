//! Merges the downloaded pages into one document after a successful batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob::Pattern;
use tracing::{debug, info, instrument};

use super::AggregationError;
use super::command::{merge_command, merged_document_path};
use super::planner::PAGE_EXTENSION;
use super::runner::{OutputMode, ProcessRunner};

/// Lists every page image in `output_dir` in page order.
///
/// Files whose stem is a page number come first, ordered numerically;
/// anything else follows by name.
///
/// # Errors
///
/// Returns [`AggregationError::Pattern`] for a directory path glob cannot
/// express, or [`AggregationError::NoInputs`] when nothing matches.
pub fn collect_inputs(output_dir: &Path) -> Result<Vec<PathBuf>, AggregationError> {
    let pattern = format!(
        "{}/*.{PAGE_EXTENSION}",
        Pattern::escape(&output_dir.to_string_lossy())
    );
    let mut inputs: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|source| AggregationError::Pattern {
            pattern: pattern.clone(),
            source,
        })?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect();
    inputs.sort_by_cached_key(|path| {
        let page = page_number_of(path);
        (page.is_none(), page, path.clone())
    });

    if inputs.is_empty() {
        return Err(AggregationError::NoInputs {
            dir: output_dir.to_path_buf(),
        });
    }
    debug!(%pattern, count = inputs.len(), "collected merge inputs");
    Ok(inputs)
}

fn page_number_of(path: &Path) -> Option<u32> {
    path.file_stem()?.to_str()?.parse().ok()
}

/// Issues the single merge command for a batch.
pub struct AggregatorTrigger {
    runner: Arc<dyn ProcessRunner>,
}

impl AggregatorTrigger {
    #[must_use]
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Merges every `*.jpg` in `output_dir` into `output_dir/slides.pdf`.
    ///
    /// The merge tool's output streams to the terminal. Downloaded pages are
    /// left in place whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError`] when there is nothing to merge, the tool
    /// cannot be started, or it exits non-zero.
    #[instrument(skip(self), fields(output_dir = %output_dir.display()))]
    pub async fn trigger(&self, output_dir: &Path) -> Result<PathBuf, AggregationError> {
        let inputs = collect_inputs(output_dir)?;
        let document = merged_document_path(output_dir);
        let command = merge_command(&inputs, &document);
        debug!(%command, "execute command");

        let report = self.runner.run(&command, OutputMode::Stream).await?;
        if !report.success() {
            return Err(AggregationError::Failed {
                exit_code: report.code,
            });
        }

        info!(document = %document.display(), pages = inputs.len(), "merged slides");
        Ok(document)
    }
}
