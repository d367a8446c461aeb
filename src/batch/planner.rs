//! Expands a page range and URL pattern into concrete download tasks.

use std::path::PathBuf;

use super::config::{BatchConfig, PAGE_PLACEHOLDER};

/// Extension of every downloaded page.
pub const PAGE_EXTENSION: &str = "jpg";

/// One page fetch: where it comes from and where it lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Page number, unique within a batch.
    pub page_number: u32,
    /// URL with every placeholder replaced by the page token.
    pub source_url: String,
    /// `{output_dir}/{token}.jpg`.
    pub destination: PathBuf,
}

/// Renders a page number the way the slide host names its images.
///
/// Pages 1 through 9 are zero-padded to two digits; larger pages are plain
/// decimal.
#[must_use]
pub fn format_page_token(page_number: u32) -> String {
    format!("{page_number:02}")
}

/// Substitutes `token` for every placeholder in `pattern`.
#[must_use]
pub fn expand_pattern(pattern: &str, token: &str) -> String {
    pattern.replace(PAGE_PLACEHOLDER, token)
}

/// Plans one task per page in `[start_page, end_page]`, in page order.
///
/// Pure: no filesystem access. An inverted range yields no tasks.
#[must_use]
pub fn plan_tasks(config: &BatchConfig) -> Vec<DownloadTask> {
    (config.start_page()..=config.end_page())
        .map(|page_number| {
            let token = format_page_token(page_number);
            DownloadTask {
                page_number,
                source_url: expand_pattern(config.url_pattern(), &token),
                destination: config
                    .output_dir()
                    .join(format!("{token}.{PAGE_EXTENSION}")),
            }
        })
        .collect()
}
