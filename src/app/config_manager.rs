//! Configuration lifecycle: merge CLI flags over file config into one `BatchConfig`.

use std::path::PathBuf;

use slidegrab_core::{BatchConfig, ConfigError, DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_DIR, Downloader, Verbosity};

use crate::app_config::FileConfig;
use crate::cli::Args;

/// Resolved configuration bundle used by the runtime.
#[derive(Debug)]
pub(crate) struct ResolvedConfig {
    pub(crate) batch: BatchConfig,
    /// True when verbosity came from `-v` flags, which then beats `RUST_LOG`.
    pub(crate) verbosity_from_cli: bool,
}

/// Merges CLI values over file defaults and validates the result.
///
/// Priority per setting: explicit CLI flag > config file > built-in default.
pub(crate) fn resolve_config(
    args: &Args,
    file_config: Option<&FileConfig>,
) -> Result<ResolvedConfig, ConfigError> {
    let file = file_config.cloned().unwrap_or_default();

    let output_dir = args
        .output
        .clone()
        .or(file.output_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let verbosity_from_cli = args.verbose > 0;
    let verbosity = if verbosity_from_cli {
        Verbosity::from_occurrences(args.verbose)
    } else {
        file.verbosity.unwrap_or_default()
    };

    let downloader = if args.use_wget {
        Downloader::Wget
    } else {
        file.downloader.unwrap_or_default()
    };

    let concurrency = args
        .concurrency
        .or(file.concurrency)
        .map_or(DEFAULT_CONCURRENCY, usize::from);

    let batch = BatchConfig::new(args.start_page, args.pages, args.url_pattern.clone(), output_dir)?
        .with_verbosity(verbosity)
        .with_downloader(downloader)
        .with_concurrency(concurrency)?;

    Ok(ResolvedConfig {
        batch,
        verbosity_from_cli,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;

    use super::*;

    const URL: &str = "https://h/s-[[[PAGE_NUM]]].jpg";

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["slidegrab", "-p", "5", "-u", URL];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_resolve_config_defaults_without_file() {
        let resolved = resolve_config(&args(&[]), None).unwrap();
        let batch = resolved.batch;
        assert_eq!(batch.output_dir(), Path::new("slideshare-output"));
        assert_eq!(batch.concurrency(), DEFAULT_CONCURRENCY);
        assert_eq!(batch.downloader(), Downloader::Curl);
        assert_eq!(batch.verbosity(), Verbosity::Silent);
        assert_eq!(batch.start_page(), 1);
        assert_eq!(batch.end_page(), 5);
        assert!(!resolved.verbosity_from_cli);
    }

    #[test]
    fn test_resolve_config_file_supplies_defaults() {
        let file = FileConfig {
            output_dir: Some(PathBuf::from("captures")),
            concurrency: Some(3),
            downloader: Some(Downloader::Wget),
            verbosity: Some(Verbosity::Verbose),
        };
        let batch = resolve_config(&args(&[]), Some(&file)).unwrap().batch;
        assert_eq!(batch.output_dir(), Path::new("captures"));
        assert_eq!(batch.concurrency(), 3);
        assert_eq!(batch.downloader(), Downloader::Wget);
        assert_eq!(batch.verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_resolve_config_cli_overrides_file() {
        let file = FileConfig {
            output_dir: Some(PathBuf::from("captures")),
            concurrency: Some(3),
            downloader: Some(Downloader::Curl),
            verbosity: Some(Verbosity::Verbose),
        };
        let resolved = resolve_config(
            &args(&["-o", "deck", "-c", "7", "--use-wget", "-vv"]),
            Some(&file),
        )
        .unwrap();
        let batch = resolved.batch;
        assert_eq!(batch.output_dir(), Path::new("deck"));
        assert_eq!(batch.concurrency(), 7);
        assert_eq!(batch.downloader(), Downloader::Wget);
        assert_eq!(batch.verbosity(), Verbosity::Trace);
        assert!(resolved.verbosity_from_cli);
    }

    #[test]
    fn test_resolve_config_rejects_zero_pages() {
        let args = Args::try_parse_from(["slidegrab", "-p", "0", "-u", URL]).unwrap();
        let err = resolve_config(&args, None).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPageCount { value: 0 });
    }

    #[test]
    fn test_resolve_config_rejects_zero_start_page() {
        let err = resolve_config(&args(&["-s", "0"]), None).unwrap_err();
        assert_eq!(err, ConfigError::InvalidStartPage { value: 0 });
    }
}
