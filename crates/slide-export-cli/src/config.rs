//! Configuration file support for slide-export.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/slide-export/config.toml` (lowest priority)
//! - Project-local: `.slide-export.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Export command settings.
    pub export: ExportConfig,
    /// Scan command settings.
    pub scan: ScanConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Export command configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default export format: "rendered", "mask", "raw" or "tiled".
    pub format: Option<String>,
    /// Default output directory.
    pub output: Option<PathBuf>,
    /// Export downsample factor (>= 1.0).
    pub downsample: Option<f64>,
    /// Export annotation sidecars.
    pub annotations: Option<bool>,
    /// Record reproducibility steps.
    pub record_steps: Option<bool>,
    /// Run a global range scan before rendered exports.
    pub global_ranges: Option<bool>,
    /// Tile edge length for tiled exports.
    pub tile_size: Option<u32>,
}

/// Scan command configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Percentile clipped from each tail (0.0-50.0).
    pub clip_percentile: Option<f64>,
    /// Scan downsample factor (>= 1.0).
    pub downsample: Option<f64>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/slide-export/config.toml`
    /// 2. Project-local: `.slide-export.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as
    /// warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load XDG config (lowest priority)
        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        // Load project-local config (higher priority, merged)
        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        // Validate merged config
        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        if let Some(d) = self.export.downsample {
            if d < 1.0 {
                return Err(format!("export.downsample must be >= 1.0, got {d}"));
            }
        }
        if let Some(d) = self.scan.downsample {
            if d < 1.0 {
                return Err(format!("scan.downsample must be >= 1.0, got {d}"));
            }
        }
        if let Some(p) = self.scan.clip_percentile {
            if !(0.0..=50.0).contains(&p) {
                return Err(format!("scan.clip_percentile must be 0.0-50.0, got {p}"));
            }
        }
        if let Some(t) = self.export.tile_size {
            if t == 0 {
                return Err("export.tile_size must be > 0".to_owned());
            }
        }
        if let Some(ref f) = self.export.format {
            if !["rendered", "mask", "raw", "tiled"].contains(&f.as_str()) {
                return Err(format!(
                    "export.format must be 'rendered', 'mask', 'raw' or 'tiled', got '{f}'"
                ));
            }
        }
        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        self.export.format = other.export.format.or(self.export.format.take());
        self.export.output = other.export.output.or(self.export.output.take());
        self.export.downsample = other.export.downsample.or(self.export.downsample);
        self.export.annotations = other.export.annotations.or(self.export.annotations);
        self.export.record_steps = other.export.record_steps.or(self.export.record_steps);
        self.export.global_ranges = other.export.global_ranges.or(self.export.global_ranges);
        self.export.tile_size = other.export.tile_size.or(self.export.tile_size);

        self.scan.clip_percentile = other.scan.clip_percentile.or(self.scan.clip_percentile);
        self.scan.downsample = other.scan.downsample.or(self.scan.downsample);

        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Path of the XDG config file.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("slide-export").join("config.toml"))
}

/// Search for `.slide-export.toml` in the current directory and its parents.
fn find_project_config() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(".slide-export.toml");
        if config_path.is_file() {
            return Some(config_path);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Parse one config file, logging failures instead of propagating them.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("warning: cannot read {}: {e}", path.display());
            return None;
        }
    };
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("warning: invalid config {}: {e}", path.display());
            None
        }
    }
}
