//! Export command - batch export every slide through one strategy.

use std::collections::BTreeSet;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use slide_export_adapters::{
    FsSlideSource, JsonStepRecorder, MaskExporter, RawExporter, RenderedExporter,
    SidecarAnnotationExporter, TiledExporter, DEFAULT_TILE_SIZE,
};
use slide_export_core::domain::{BatchItem, ExportTally};
use slide_export_core::ports::ExportStrategy;
use slide_export_core::runner::{BatchOptions, BatchRunner};
use slide_export_core::scan::RangeScanner;
use tracing::{info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Hardcoded default values.
mod defaults {
    pub const DOWNSAMPLE: f64 = 1.0;
    pub const CLIP_PERCENTILE: f64 = 1.0;
    pub const OUTPUT_DIR: &str = "export";
}

/// Export flavor selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Channels composited to an 8-bit RGB image
    #[default]
    Rendered,
    /// Integer label image to a palettized mask
    Mask,
    /// Channel-planar little-endian sample dump
    Raw,
    /// Fixed-size tile grid plus manifest
    Tiled,
}

/// Parse and validate a downsample factor (>= 1.0).
pub(crate) fn parse_downsample(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value >= 1.0 {
        Ok(value)
    } else {
        Err(format!("{value} is not >= 1.0"))
    }
}

/// Parse and validate a tail-clip percentile (0.0-50.0).
pub(crate) fn parse_percentile(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=50.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=50.0"))
    }
}

/// Arguments for the export command.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExportArgs {
    /// Files or directories holding slides to export
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Export flavor
    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Downsample factor applied when reading slides (>= 1.0)
    #[arg(long, value_parser = parse_downsample)]
    pub downsample: Option<f64>,

    /// Export annotation sidecars alongside each slide
    #[arg(long)]
    pub annotations: bool,

    /// Record a reproducibility step for each successful export
    #[arg(long)]
    pub record_steps: bool,

    /// Compute globally consistent display ranges before rendering
    #[arg(long)]
    pub global_ranges: bool,

    /// Percentile clipped from each tail during the range scan (0.0-50.0)
    #[arg(long, value_parser = parse_percentile)]
    pub clip: Option<f64>,

    /// Tile edge length for tiled exports
    #[arg(long, value_name = "PIXELS")]
    pub tile_size: Option<u32>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Pretty-print the JSON summary
    #[arg(long)]
    pub pretty: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl ExportArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        if args.format.is_none() {
            args.format = config.export.format.as_ref().and_then(|s| match s.as_str() {
                "rendered" => Some(ExportFormat::Rendered),
                "mask" => Some(ExportFormat::Mask),
                "raw" => Some(ExportFormat::Raw),
                "tiled" => Some(ExportFormat::Tiled),
                _ => None,
            });
        }

        if args.output.is_none() {
            args.output.clone_from(&config.export.output);
        }
        args.downsample = args.downsample.or(config.export.downsample);
        args.clip = args.clip.or(config.scan.clip_percentile);
        args.tile_size = args.tile_size.or(config.export.tile_size);

        if !args.annotations {
            args.annotations = config.export.annotations.unwrap_or(false);
        }
        if !args.record_steps {
            args.record_steps = config.export.record_steps.unwrap_or(false);
        }
        if !args.global_ranges {
            args.global_ranges = config.export.global_ranges.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }

        args.config = Some(config.clone());
        args
    }

    fn format(&self) -> ExportFormat {
        self.format.unwrap_or_default()
    }

    fn output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::OUTPUT_DIR))
    }

    fn downsample(&self) -> f64 {
        self.downsample.unwrap_or(defaults::DOWNSAMPLE)
    }

    fn clip(&self) -> f64 {
        self.clip.unwrap_or(defaults::CLIP_PERCENTILE)
    }

    fn tile_size(&self) -> u32 {
        self.tile_size.unwrap_or(DEFAULT_TILE_SIZE)
    }
}

/// Result of running the export command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct ExportResult {
    /// The final batch tally.
    pub tally: ExportTally,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the export command.
pub fn run(args: &ExportArgs) -> Result<ExportResult> {
    let args = ExportArgs::with_config(args.clone(), &AppConfig::load());

    info!("Running export command on {} paths", args.paths.len());
    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let source = FsSlideSource::new(args.paths.clone(), args.recursive);
    let items = source.items();

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = ProgressBar::new(Some(items.len() as u64), args.quiet, show_progress);

    let strategy = build_strategy(&args, &source, &items, &progress);

    let annotations = SidecarAnnotationExporter::new(annotation_search_dirs(&items), args.output());
    let recorder = JsonStepRecorder::new(args.output());
    let options = BatchOptions {
        export_annotations: args.annotations,
        record_steps: args.record_steps,
    };

    let runner = BatchRunner::new(&source, strategy.as_ref(), options)
        .with_annotations(&annotations)
        .with_recorder(&recorder)
        .with_progress(&progress);

    let tally = runner.run(&items);
    progress.finish();

    JsonOutput::stdout().write_summary(&tally, args.pretty)?;

    let exit_code = if tally.is_clean() {
        ExitCode::Success
    } else {
        ExitCode::ExportsFailed
    };
    Ok(ExportResult { tally, exit_code })
}

/// Build the selected export strategy, running the global range scan first
/// when the caller asked for batch-consistent rendering.
fn build_strategy(
    args: &ExportArgs,
    source: &FsSlideSource,
    items: &[BatchItem],
    progress: &ProgressBar,
) -> Box<dyn ExportStrategy> {
    match args.format() {
        ExportFormat::Rendered => {
            let mut exporter = RenderedExporter::new(args.output(), args.downsample());
            if args.global_ranges {
                let scanner = RangeScanner::new(source).with_progress(progress);
                let ranges = scanner.compute_global_ranges(items, args.clip(), args.downsample());
                if ranges.is_empty() {
                    warn!("Global range scan produced no ranges, rendering per-slide");
                } else {
                    exporter = exporter.with_ranges(ranges);
                }
            }
            Box::new(exporter)
        }
        ExportFormat::Mask => Box::new(MaskExporter::new(args.output(), args.downsample())),
        ExportFormat::Raw => Box::new(RawExporter::new(args.output(), args.downsample())),
        ExportFormat::Tiled => Box::new(TiledExporter::new(
            args.output(),
            args.downsample(),
            args.tile_size(),
        )),
    }
}

/// Directories searched for annotation sidecars: every distinct parent of
/// the batch items.
fn annotation_search_dirs(items: &[BatchItem]) -> Vec<PathBuf> {
    let dirs: BTreeSet<PathBuf> = items
        .iter()
        .filter_map(|item| item.path.parent().map(PathBuf::from))
        .collect();
    dirs.into_iter().collect()
}
