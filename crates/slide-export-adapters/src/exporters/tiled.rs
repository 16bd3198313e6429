//! Tiled dataset export.

use std::path::PathBuf;

use anyhow::Context;
use image::RgbImage;
use serde::Serialize;
use slide_export_core::domain::ExportError;
use slide_export_core::ports::{ExportStrategy, SlideHandle};

use super::{compose_rgb, full_domain_ranges};

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Manifest written next to each tile grid.
#[derive(Serialize)]
struct TileManifest {
    width: u32,
    height: u32,
    tile_size: u32,
    cols: u32,
    rows: u32,
    downsample: f64,
}

/// Exports a slide as a fixed-size grid of RGB PNG tiles plus a JSON
/// manifest.
///
/// Slides smaller than one tile are padded with black rather than
/// rejected; only a slide reporting no channels at all is structurally
/// incompatible.
pub struct TiledExporter {
    output_dir: PathBuf,
    downsample: f64,
    tile_size: u32,
}

impl TiledExporter {
    /// Creates an exporter writing one `{name}/` tile directory per slide
    /// into `output_dir`.
    #[must_use]
    pub const fn new(output_dir: PathBuf, downsample: f64, tile_size: u32) -> Self {
        Self {
            output_dir,
            downsample,
            tile_size,
        }
    }
}

impl ExportStrategy for TiledExporter {
    fn kind(&self) -> &'static str {
        "tiled"
    }

    fn export(&self, slide: &mut dyn SlideHandle, name: &str) -> Result<(), ExportError> {
        let descriptor = slide.descriptor().clone();
        if descriptor.channel_count() == 0 {
            return Err(ExportError::incompatible("slide reports no channels"));
        }

        let region = slide.read_region(self.downsample)?;
        let composed = compose_rgb(&region, &full_domain_ranges(&descriptor));

        let tile_dir = self.output_dir.join(name);
        std::fs::create_dir_all(&tile_dir)
            .with_context(|| format!("Failed to create {}", tile_dir.display()))?;

        let cols = region.width.div_ceil(self.tile_size);
        let rows = region.height.div_ceil(self.tile_size);
        for row in 0..rows {
            for col in 0..cols {
                let tile = RgbImage::from_fn(self.tile_size, self.tile_size, |x, y| {
                    let sx = col * self.tile_size + x;
                    let sy = row * self.tile_size + y;
                    if sx < region.width && sy < region.height {
                        *composed.get_pixel(sx, sy)
                    } else {
                        image::Rgb([0, 0, 0])
                    }
                });
                let path = tile_dir.join(format!("tile_{col}_{row}.png"));
                tile.save(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
        }

        let manifest = TileManifest {
            width: region.width,
            height: region.height,
            tile_size: self.tile_size,
            cols,
            rows,
            downsample: self.downsample,
        };
        let manifest_path = tile_dir.join("manifest.json");
        let json = serde_json::to_string_pretty(&manifest).context("Failed to encode manifest")?;
        std::fs::write(&manifest_path, json)
            .with_context(|| format!("Failed to write {}", manifest_path.display()))?;
        Ok(())
    }

    fn step_script(&self) -> String {
        format!(
            "slide-export export --format tiled --tile-size {} --downsample {} --output {}",
            self.tile_size,
            self.downsample,
            self.output_dir.display()
        )
    }
}
