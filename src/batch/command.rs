//! Fixed command templates for the download and merge tools.
//!
//! Commands are built as a program plus an argument vector and spawned
//! directly, so URLs containing `&` or `?` need no shell quoting.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use super::config::{Downloader, Verbosity};
use super::planner::DownloadTask;

/// Image merge tool (ImageMagick).
pub const MERGE_PROGRAM: &str = "convert";

/// File name of the merged document inside the output directory.
pub const MERGED_DOCUMENT: &str = "slides.pdf";

/// A fully formed external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<OsString>,
}

impl CommandLine {
    /// Creates a command with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Builds the fetch command for one task.
///
/// The tool runs in its quiet mode unless verbosity is at least `Verbose`.
#[must_use]
pub fn download_command(
    downloader: Downloader,
    verbosity: Verbosity,
    task: &DownloadTask,
) -> CommandLine {
    let quiet = verbosity == Verbosity::Silent;
    match downloader {
        Downloader::Curl => {
            let cmd = CommandLine::new(downloader.program());
            let cmd = if quiet { cmd.arg("--silent") } else { cmd };
            cmd.arg("-L")
                .arg(task.source_url.as_str())
                .arg("-o")
                .arg(task.destination.as_os_str())
        }
        Downloader::Wget => {
            let cmd = CommandLine::new(downloader.program());
            let cmd = if quiet { cmd.arg("--quiet") } else { cmd };
            cmd.arg("--no-check-certificate")
                .arg(task.source_url.as_str())
                .arg("-O")
                .arg(task.destination.as_os_str())
        }
    }
}

/// Path of the merged document for an output directory.
#[must_use]
pub fn merged_document_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MERGED_DOCUMENT)
}

/// Builds the merge command over an already expanded, ordered input list.
#[must_use]
pub fn merge_command(inputs: &[PathBuf], output: &Path) -> CommandLine {
    CommandLine::new(MERGE_PROGRAM)
        .args(inputs.iter().map(|p| p.as_os_str().to_os_string()))
        .arg("-auto-orient")
        .arg(output.as_os_str())
}
