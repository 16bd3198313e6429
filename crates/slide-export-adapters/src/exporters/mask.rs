//! Label mask export.

use std::path::PathBuf;

use anyhow::Context;
use image::RgbImage;
use slide_export_core::domain::ExportError;
use slide_export_core::ports::{ExportStrategy, SlideHandle};

/// Distinct colors cycled through for nonzero labels; label 0 stays black.
const LABEL_PALETTE: [[u8; 3]; 8] = [
    [230, 25, 75],
    [60, 180, 75],
    [255, 225, 25],
    [0, 130, 200],
    [245, 130, 48],
    [145, 30, 180],
    [70, 240, 240],
    [240, 50, 230],
];

/// Exports single-channel integer label images as palettized PNGs.
///
/// Structurally incompatible with floating point slides and with
/// multi-channel slides; those are skip-classified by the runner rather
/// than failed.
pub struct MaskExporter {
    output_dir: PathBuf,
    downsample: f64,
}

impl MaskExporter {
    /// Creates an exporter writing `{name}_mask.png` files into
    /// `output_dir`.
    #[must_use]
    pub const fn new(output_dir: PathBuf, downsample: f64) -> Self {
        Self {
            output_dir,
            downsample,
        }
    }
}

impl ExportStrategy for MaskExporter {
    fn kind(&self) -> &'static str {
        "mask"
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn export(&self, slide: &mut dyn SlideHandle, name: &str) -> Result<(), ExportError> {
        let descriptor = slide.descriptor();
        if descriptor.is_float {
            return Err(ExportError::incompatible(
                "label export requires an integer label image",
            ));
        }
        if descriptor.channel_count() != 1 {
            return Err(ExportError::incompatible(format!(
                "label export requires a single channel, slide has {}",
                descriptor.channel_count()
            )));
        }

        let region = slide.read_region(self.downsample)?;
        let mask = RgbImage::from_fn(region.width, region.height, |x, y| {
            let label = region.sample((y * region.width + x) as usize, 0) as usize;
            if label == 0 {
                image::Rgb([0, 0, 0])
            } else {
                image::Rgb(LABEL_PALETTE[(label - 1) % LABEL_PALETTE.len()])
            }
        });

        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;
        let path = self.output_dir.join(format!("{name}_mask.png"));
        mask.save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn step_script(&self) -> String {
        format!(
            "slide-export export --format mask --downsample {} --output {}",
            self.downsample,
            self.output_dir.display()
        )
    }
}
