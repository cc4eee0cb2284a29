use crate::io::ScrubMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Convert an Activity Statement export into trade-journal rows
#[derive(Parser, Debug)]
#[command(name = "trade-journal")]
#[command(about = "Convert an Activity Statement export into trade-journal rows", long_about = None)]
pub struct CliArgs {
    /// Activity Statement CSV file
    #[arg(long = "data", value_name = "PATH", help = "Path to the statement CSV")]
    pub data: PathBuf,

    /// Journal CSV to create
    #[arg(
        long = "output",
        value_name = "PATH",
        default_value = "transactions.csv",
        help = "Path of the journal CSV to write"
    )]
    pub output: PathBuf,

    /// Persist the scrubbed statement over the input file
    #[arg(
        long = "scrub-in-place",
        help = "Write the scrubbed statement back over the input file"
    )]
    pub scrub_in_place: bool,

    /// Logging verbosity (logs go to stderr)
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "warn",
        help = "Log level: error, warn, info, debug or trace"
    )]
    pub log_level: LogLevel,

    /// Do not list transactions on stdout
    #[arg(long = "quiet", short = 'q', help = "Do not list transactions on stdout")]
    pub quiet: bool,
}

/// Available log levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl CliArgs {
    /// Scrub mode selected by `--scrub-in-place`
    pub fn scrub_mode(&self) -> ScrubMode {
        if self.scrub_in_place {
            ScrubMode::InPlace
        } else {
            ScrubMode::InMemory
        }
    }
}
