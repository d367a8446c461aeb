//! Immutable batch configuration.
//!
//! A [`BatchConfig`] is built once from resolved arguments, validated, and
//! then passed by reference to every component of the batch.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::ConfigError;

/// Literal token in the URL pattern replaced by the formatted page number.
pub const PAGE_PLACEHOLDER: &str = "[[[PAGE_NUM]]]";

/// Output folder used when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "slideshare-output";

/// Default worker pool size.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Highest page number a batch may request.
pub const MAX_PAGE_NUMBER: u32 = 9_999;

/// Minimum allowed worker pool size.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed worker pool size.
pub const MAX_CONCURRENCY: usize = 100;

/// Logging level and subprocess output policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Progress summary only; download tools run in their quiet mode.
    #[default]
    Silent,
    /// Logs every command; download tool output is still discarded.
    Verbose,
    /// Like `Verbose`, and download subprocess stderr reaches the terminal.
    Trace,
}

impl Verbosity {
    /// Maps a `-v` occurrence count to a level.
    #[must_use]
    pub fn from_occurrences(count: u8) -> Self {
        match count {
            0 => Self::Silent,
            1 => Self::Verbose,
            _ => Self::Trace,
        }
    }

    /// Default `tracing` filter directive for this level.
    #[must_use]
    pub fn log_level(self) -> &'static str {
        match self {
            Self::Silent => "info",
            Self::Verbose => "debug",
            Self::Trace => "trace",
        }
    }

    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Verbose => "verbose",
            Self::Trace => "trace",
        }
    }
}

/// External tool used to fetch each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Downloader {
    #[default]
    Curl,
    Wget,
}

impl Downloader {
    /// Program name looked up on `PATH`.
    #[must_use]
    pub fn program(self) -> &'static str {
        match self {
            Self::Curl => "curl",
            Self::Wget => "wget",
        }
    }
}

impl fmt::Display for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Resolved settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    start_page: u32,
    end_page: u32,
    url_pattern: String,
    output_dir: PathBuf,
    verbosity: Verbosity,
    downloader: Downloader,
    concurrency: usize,
}

impl BatchConfig {
    /// Validates raw values and builds the configuration.
    ///
    /// `end_page` is the last page number, inclusive. An `end_page` below
    /// `start_page` is accepted and yields an empty batch.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when either page number is below 1, when
    /// `end_page` exceeds [`MAX_PAGE_NUMBER`], when the pattern lacks [`PAGE_PLACEHOLDER`], or when `concurrency` is outside
    /// `MIN_CONCURRENCY..=MAX_CONCURRENCY`.
    pub fn new(
        start_page: i64,
        end_page: i64,
        url_pattern: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if end_page < 1 {
            return Err(ConfigError::InvalidPageCount { value: end_page });
        }
        let end_page = u32::try_from(end_page)
            .ok()
            .filter(|page| *page <= MAX_PAGE_NUMBER)
            .ok_or(ConfigError::PageCountTooLarge { value: end_page })?;
        let start_page = u32::try_from(start_page)
            .ok()
            .filter(|page| *page >= 1)
            .ok_or(ConfigError::InvalidStartPage { value: start_page })?;

        let url_pattern = url_pattern.into();
        if !url_pattern.contains(PAGE_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder {
                pattern: url_pattern,
            });
        }

        let config = Self {
            start_page,
            end_page,
            url_pattern,
            output_dir: output_dir.into(),
            verbosity: Verbosity::default(),
            downloader: Downloader::default(),
            concurrency: DEFAULT_CONCURRENCY,
        };
        debug!(?config, "batch configuration built");
        Ok(config)
    }

    /// Sets the verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Selects the download tool.
    #[must_use]
    pub fn with_downloader(mut self, downloader: Downloader) -> Self {
        self.downloader = downloader;
        self
    }

    /// Sets the worker pool size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConcurrency`] outside `1..=100`.
    pub fn with_concurrency(mut self, concurrency: usize) -> Result<Self, ConfigError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(ConfigError::InvalidConcurrency { value: concurrency });
        }
        self.concurrency = concurrency;
        Ok(self)
    }

    #[must_use]
    pub fn start_page(&self) -> u32 {
        self.start_page
    }

    #[must_use]
    pub fn end_page(&self) -> u32 {
        self.end_page
    }

    #[must_use]
    pub fn url_pattern(&self) -> &str {
        &self.url_pattern
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    #[must_use]
    pub fn downloader(&self) -> Downloader {
        self.downloader
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Number of pages in `[start_page, end_page]`, zero when the range is inverted.
    #[must_use]
    pub fn page_count(&self) -> usize {
        if self.end_page < self.start_page {
            0
        } else {
            (self.end_page - self.start_page) as usize + 1
        }
    }
}
