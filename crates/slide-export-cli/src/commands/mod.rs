//! CLI command definitions and handlers.

pub mod export;
pub mod scan;

use clap::{Parser, Subcommand};

/// Slide Export - batch export and range scanning for microscopy images
#[derive(Parser)]
#[command(name = "slide-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Export every slide in a batch
    Export(export::ExportArgs),
    /// Compute global per-channel display ranges for a batch
    Scan(scan::ScanArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Everything succeeded (skips included; they are benign).
    Success,
    /// At least one export failed.
    ExportsFailed,
    /// The command itself could not run.
    Error,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => Self::from(0),
            ExitCode::ExportsFailed => Self::from(1),
            ExitCode::Error => Self::from(2),
        }
    }
}
