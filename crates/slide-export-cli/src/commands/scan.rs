//! Scan command - compute global per-channel display ranges.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use slide_export_adapters::FsSlideSource;
use slide_export_core::scan::RangeScanner;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Hardcoded default values.
mod defaults {
    pub const DOWNSAMPLE: f64 = 8.0;
    pub const CLIP_PERCENTILE: f64 = 1.0;
}

/// Arguments for the scan command.
#[derive(Args, Clone)]
pub struct ScanArgs {
    /// Files or directories holding slides to scan
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Percentile clipped from each tail (0.0-50.0)
    #[arg(long, value_parser = super::export::parse_percentile)]
    pub clip: Option<f64>,

    /// Downsample factor applied when reading slides (>= 1.0)
    #[arg(long, value_parser = super::export::parse_downsample)]
    pub downsample: Option<f64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl ScanArgs {
    /// Apply configuration file values, respecting CLI precedence.
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }
        args.clip = args.clip.or(config.scan.clip_percentile);
        args.downsample = args.downsample.or(config.scan.downsample);
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }
        args
    }

    fn clip(&self) -> f64 {
        self.clip.unwrap_or(defaults::CLIP_PERCENTILE)
    }

    fn downsample(&self) -> f64 {
        self.downsample.unwrap_or(defaults::DOWNSAMPLE)
    }
}

/// Run the scan command.
pub fn run(args: &ScanArgs) -> Result<()> {
    let args = ScanArgs::with_config(args.clone(), &AppConfig::load());

    info!("Running scan command on {} paths", args.paths.len());
    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let source = FsSlideSource::new(args.paths.clone(), args.recursive);
    let items = source.items();

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = ProgressBar::new(Some(items.len() as u64), args.quiet, show_progress);

    let scanner = RangeScanner::new(&source).with_progress(&progress);
    let ranges = scanner.compute_global_ranges(&items, args.clip(), args.downsample());
    progress.finish();

    if ranges.is_empty() && !items.is_empty() {
        warn!("Scan produced no ranges; callers should fall back to per-slide display");
    }

    JsonOutput::stdout().write_ranges(&ranges, args.pretty)?;
    Ok(())
}
