//! CLI argument definitions using clap derive macros.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::ProcessExit;

/// Download a numbered sequence of slide images and merge them into one PDF.
///
/// Each page is fetched with curl (or wget) into OUTPUT_FOLDER as NN.jpg,
/// then ImageMagick `convert` merges them into OUTPUT_FOLDER/slides.pdf.
#[derive(Parser, Debug)]
#[command(name = "slidegrab")]
#[command(author, version, about)]
#[command(after_help = "Example:\n  \
    slidegrab -p 47 -u 'https://image.slidesharecdn.com/deck-180214150135/95/deck-[[[PAGE_NUM]]]-638.jpg?cb=1544018344'")]
pub struct Args {
    /// Last page number to retrieve (inclusive)
    #[arg(short = 'p', long = "pages", value_name = "NUM_PAGES", allow_negative_numbers = true)]
    pub pages: i64,

    /// URL pattern with [[[PAGE_NUM]]] replacing the page number
    #[arg(short = 'u', long = "url-pattern", value_name = "URL_PATTERN")]
    pub url_pattern: String,

    /// First page to capture
    #[arg(
        short = 's',
        long = "start-page",
        value_name = "START_PAGE",
        default_value_t = 1,
        allow_negative_numbers = true
    )]
    pub start_page: i64,

    /// Output folder [default: slideshare-output]
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_FOLDER")]
    pub output: Option<PathBuf>,

    /// Increase output verbosity (-v logs commands, -vv also shows download tool errors)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Use wget instead of curl for downloads
    #[arg(long = "use-wget")]
    pub use_wget: bool,

    /// Maximum concurrent downloads (1-100) [default: 10]
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,
}

/// Maps a parse failure to the process exit outcome.
///
/// Help, version and a missing required flag all end with usage on screen
/// and exit 0; any other malformed input exits 1.
pub(crate) fn exit_for_error_kind(kind: ErrorKind) -> ProcessExit {
    match kind {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        | ErrorKind::MissingRequiredArgument => ProcessExit::Success,
        _ => ProcessExit::Failure,
    }
}

/// Parses arguments, printing help or errors itself.
///
/// Returns the exit outcome when no batch should run.
pub(crate) fn parse_args_from<I, T>(itr: I) -> Result<Args, ProcessExit>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(itr).map_err(|err| {
        if err.kind() == ErrorKind::MissingRequiredArgument {
            let _ = Args::command().print_help();
            eprintln!();
        }
        let _ = err.print();
        exit_for_error_kind(err.kind())
    })
}

/// Short usage line for configuration errors.
pub(crate) fn usage() -> String {
    Args::command().render_usage().to_string()
}
