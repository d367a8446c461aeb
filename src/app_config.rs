//! Application configuration loading for CLI defaults.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use slidegrab_core::batch::{MAX_CONCURRENCY, MIN_CONCURRENCY};
use slidegrab_core::{Downloader, Verbosity};

/// TOML-backed file configuration for slidegrab defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    /// Default output folder.
    pub(crate) output_dir: Option<PathBuf>,
    /// Default worker pool size (same range as CLI).
    pub(crate) concurrency: Option<u8>,
    /// Default download tool.
    pub(crate) downloader: Option<Downloader>,
    /// Default verbosity mode.
    pub(crate) verbosity: Option<Verbosity>,
}

impl FileConfig {
    /// Validates config values against CLI constraints.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(concurrency) = self.concurrency
            && !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&usize::from(concurrency))
        {
            bail!(
                "Invalid config value for `concurrency`: {concurrency}. Expected range: {MIN_CONCURRENCY}..={MAX_CONCURRENCY}"
            );
        }
        if let Some(output_dir) = &self.output_dir
            && output_dir.as_os_str().is_empty()
        {
            bail!("Invalid config value for `output_dir`: must not be empty");
        }
        Ok(())
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/slidegrab/config.toml`
/// 2. `$HOME/.config/slidegrab/config.toml`
#[must_use]
pub(crate) fn resolve_default_config_path() -> Option<PathBuf> {
    config_path_from(env_var_non_empty_os("XDG_CONFIG_HOME"), env_var_non_empty_os("HOME"))
}

fn config_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(xdg_config_home) = xdg_config_home {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("slidegrab")
                .join("config.toml"),
        );
    }

    let home = home?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("slidegrab")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub(crate) fn load_default_file_config() -> Result<Option<FileConfig>> {
    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let cfg: FileConfig = toml::from_str(raw)?;
    cfg.validate()?;
    Ok(cfg)
}
