use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use intake_logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "intake")]
#[command(about = "Upload text and PDF files and collect their summaries")]
pub struct Args {
    /// RON configuration file; defaults apply when it does not exist
    #[arg(short, long, default_value = "intake.ron")]
    pub config: PathBuf,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    /// Skip the notify step and take object keys from the transfer
    #[arg(long)]
    pub no_notify: bool,

    /// Files to ingest, at most five
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
