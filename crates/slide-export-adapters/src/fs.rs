//! Filesystem slide source backed by the `image` crate.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::DynamicImage;
use slide_export_core::domain::{BatchItem, ChannelInfo, PixelBuffer, Region, SlideDescriptor};
use slide_export_core::ports::{SlideHandle, SlideSource};
use tracing::{debug, warn};

/// Supported raster extensions.
const SLIDE_EXTENSIONS: &[&str] = &["tif", "tiff", "png", "jpg", "jpeg", "bmp", "webp"];

const COLOR_GRAY: u32 = 0xFFFF_FFFF;
const COLOR_RED: u32 = 0xFFFF_0000;
const COLOR_GREEN: u32 = 0xFF00_FF00;
const COLOR_BLUE: u32 = 0xFF00_00FF;
const COLOR_ALPHA: u32 = 0xFF80_8080;

/// Filesystem slide source.
pub struct FsSlideSource {
    paths: Vec<PathBuf>,
    recursive: bool,
}

impl FsSlideSource {
    /// Creates a source over files and/or directories.
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self { paths, recursive }
    }

    /// Collects batch items for every supported file under the configured
    /// paths, sorted by path for deterministic batch order.
    #[must_use]
    pub fn items(&self) -> Vec<BatchItem> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                if is_supported_slide(path) {
                    files.push(path.clone());
                } else {
                    warn!("Unsupported file type: {}", path.display());
                }
            } else if path.is_dir() {
                self.collect_from_dir(path, &mut files);
            } else {
                warn!("Path does not exist: {}", path.display());
            }
        }

        files.sort();
        debug!("Found {} slide files", files.len());
        files.into_iter().map(BatchItem::from_path).collect()
    }

    fn collect_from_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && is_supported_slide(&path) {
                files.push(path);
            } else if path.is_dir() && self.recursive {
                self.collect_from_dir(&path, files);
            }
        }
    }
}

impl SlideSource for FsSlideSource {
    fn open(&self, item: &BatchItem) -> Result<Box<dyn SlideHandle>> {
        let image = image::open(&item.path)
            .with_context(|| format!("Failed to open slide: {}", item.path.display()))?;
        let descriptor = descriptor_for(&image);
        Ok(Box::new(FsSlideHandle {
            descriptor,
            image: Some(image),
        }))
    }
}

/// One open, decoded slide. `close` drops the decoded pixels.
struct FsSlideHandle {
    descriptor: SlideDescriptor,
    image: Option<DynamicImage>,
}

impl SlideHandle for FsSlideHandle {
    fn descriptor(&self) -> &SlideDescriptor {
        &self.descriptor
    }

    fn read_region(&mut self, downsample: f64) -> Result<Region> {
        let image = self
            .image
            .as_ref()
            .context("slide handle is already closed")?;
        anyhow::ensure!(downsample >= 1.0, "downsample must be >= 1, got {downsample}");
        Ok(read_downsampled(image, downsample))
    }

    fn close(&mut self) -> Result<()> {
        self.image = None;
        Ok(())
    }
}

/// Checks if a path has a supported slide extension.
fn is_supported_slide(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| SLIDE_EXTENSIONS.contains(&e.as_str()))
}

/// Maps a decoded image's color type to slide metadata.
fn descriptor_for(image: &DynamicImage) -> SlideDescriptor {
    use image::DynamicImage::{ImageRgb32F, ImageRgba32F};

    let color = image.color();
    let channels = match color.channel_count() {
        1 => vec![ChannelInfo::new("Gray", COLOR_GRAY)],
        2 => vec![
            ChannelInfo::new("Gray", COLOR_GRAY),
            ChannelInfo::new("Alpha", COLOR_ALPHA),
        ],
        3 => vec![
            ChannelInfo::new("Red", COLOR_RED),
            ChannelInfo::new("Green", COLOR_GREEN),
            ChannelInfo::new("Blue", COLOR_BLUE),
        ],
        _ => vec![
            ChannelInfo::new("Red", COLOR_RED),
            ChannelInfo::new("Green", COLOR_GREEN),
            ChannelInfo::new("Blue", COLOR_BLUE),
            ChannelInfo::new("Alpha", COLOR_ALPHA),
        ],
    };
    let is_float = matches!(image, ImageRgb32F(_) | ImageRgba32F(_));

    SlideDescriptor {
        width: image.width(),
        height: image.height(),
        channels,
        bit_depth: if is_float {
            32
        } else {
            (color.bits_per_pixel() / u16::from(color.channel_count())) as u8
        },
        is_float,
    }
}

/// Nearest-neighbour whole-image read at `downsample`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn read_downsampled(image: &DynamicImage, downsample: f64) -> Region {
    let out_width = ((f64::from(image.width()) / downsample).round() as u32).max(1);
    let out_height = ((f64::from(image.height()) / downsample).round() as u32).max(1);

    macro_rules! sample_buffer {
        ($buf:expr, $variant:ident) => {{
            let buf = $buf;
            let channels = usize::from(image.color().channel_count());
            let mut out = Vec::with_capacity(out_width as usize * out_height as usize * channels);
            for y in 0..out_height {
                for x in 0..out_width {
                    let sx = (((f64::from(x) + 0.5) * downsample) as u32).min(buf.width() - 1);
                    let sy = (((f64::from(y) + 0.5) * downsample) as u32).min(buf.height() - 1);
                    out.extend_from_slice(&buf.get_pixel(sx, sy).0);
                }
            }
            (PixelBuffer::$variant(out), channels)
        }};
    }

    let (pixels, channels) = match image {
        DynamicImage::ImageLuma8(buf) => sample_buffer!(buf, U8),
        DynamicImage::ImageLumaA8(buf) => sample_buffer!(buf, U8),
        DynamicImage::ImageRgb8(buf) => sample_buffer!(buf, U8),
        DynamicImage::ImageRgba8(buf) => sample_buffer!(buf, U8),
        DynamicImage::ImageLuma16(buf) => sample_buffer!(buf, U16),
        DynamicImage::ImageLumaA16(buf) => sample_buffer!(buf, U16),
        DynamicImage::ImageRgb16(buf) => sample_buffer!(buf, U16),
        DynamicImage::ImageRgba16(buf) => sample_buffer!(buf, U16),
        DynamicImage::ImageRgb32F(buf) => sample_buffer!(buf, F32),
        DynamicImage::ImageRgba32F(buf) => sample_buffer!(buf, F32),
        other => {
            let buf = other.to_rgba8();
            let mut out =
                Vec::with_capacity(out_width as usize * out_height as usize * 4);
            for y in 0..out_height {
                for x in 0..out_width {
                    let sx = (((f64::from(x) + 0.5) * downsample) as u32).min(buf.width() - 1);
                    let sy = (((f64::from(y) + 0.5) * downsample) as u32).min(buf.height() - 1);
                    out.extend_from_slice(&buf.get_pixel(sx, sy).0);
                }
            }
            (PixelBuffer::U8(out), 4)
        }
    };

    Region {
        width: out_width,
        height: out_height,
        channels,
        pixels,
    }
}
