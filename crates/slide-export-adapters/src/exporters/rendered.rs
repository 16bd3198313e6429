//! Rendered overlay export.

use std::path::PathBuf;

use anyhow::Context;
use slide_export_core::domain::{ChannelRange, ExportError};
use slide_export_core::ports::{ExportStrategy, SlideHandle};

use super::{compose_rgb, full_domain_ranges};

/// Renders a slide's channels into a single 8-bit RGB PNG.
///
/// When the caller ran a global range scan, the computed ranges are applied
/// so brightness is consistent across the whole batch; otherwise each
/// slide falls back to its full pixel domain.
pub struct RenderedExporter {
    output_dir: PathBuf,
    downsample: f64,
    ranges: Option<Vec<ChannelRange>>,
}

impl RenderedExporter {
    /// Creates an exporter writing `{name}.png` files into `output_dir`.
    #[must_use]
    pub const fn new(output_dir: PathBuf, downsample: f64) -> Self {
        Self {
            output_dir,
            downsample,
            ranges: None,
        }
    }

    /// Applies globally computed display ranges to every rendered slide.
    #[must_use]
    pub fn with_ranges(mut self, ranges: Vec<ChannelRange>) -> Self {
        self.ranges = Some(ranges);
        self
    }
}

impl ExportStrategy for RenderedExporter {
    fn kind(&self) -> &'static str {
        "rendered"
    }

    fn export(&self, slide: &mut dyn SlideHandle, name: &str) -> Result<(), ExportError> {
        let descriptor = slide.descriptor().clone();
        if descriptor.channel_count() == 0 {
            return Err(ExportError::incompatible("slide reports no channels"));
        }

        let region = slide.read_region(self.downsample)?;
        let ranges = self
            .ranges
            .clone()
            .unwrap_or_else(|| full_domain_ranges(&descriptor));

        let composed = compose_rgb(&region, &ranges);
        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;
        let path = self.output_dir.join(format!("{name}.png"));
        composed
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn step_script(&self) -> String {
        format!(
            "slide-export export --format rendered --downsample {} --output {}",
            self.downsample,
            self.output_dir.display()
        )
    }
}
