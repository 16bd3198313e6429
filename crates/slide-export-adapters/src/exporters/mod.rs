//! Concrete export strategies.
//!
//! One module per strategy, each owning its immutable configuration and
//! implementing the core `ExportStrategy` port: rendered overlays, label
//! masks, raw sample dumps and tiled pyramids.

mod mask;
mod raw;
mod rendered;
mod tiled;

pub use mask::MaskExporter;
pub use raw::RawExporter;
pub use rendered::RenderedExporter;
pub use tiled::{TiledExporter, DEFAULT_TILE_SIZE};

use image::RgbImage;
use slide_export_core::domain::{ChannelRange, Region, SlideDescriptor};

/// Full-domain fallback ranges implied by a slide's pixel format.
///
/// Used when no globally computed ranges were supplied; float slides
/// default to `[0, 1]`, integer slides to their bit-depth capacity.
fn full_domain_ranges(descriptor: &SlideDescriptor) -> Vec<ChannelRange> {
    #[allow(clippy::cast_precision_loss)]
    let max_display = if descriptor.is_float {
        1.0
    } else {
        (1u64 << descriptor.bit_depth) as f64 - 1.0
    };
    descriptor
        .channels
        .iter()
        .map(|info| ChannelRange {
            name: info.name.clone(),
            color: info.color,
            min_display: 0.0,
            max_display,
        })
        .collect()
}

/// Additively composites a region's channels into an 8-bit RGB image,
/// normalizing each channel through its display range and tinting it with
/// the channel color.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn compose_rgb(region: &Region, ranges: &[ChannelRange]) -> RgbImage {
    let used = region.channels.min(ranges.len());
    RgbImage::from_fn(region.width, region.height, |x, y| {
        let pixel = (y * region.width + x) as usize;
        let mut acc = [0.0f64; 3];
        for (channel, range) in ranges.iter().take(used).enumerate() {
            let value = range.normalize(region.sample(pixel, channel));
            acc[0] += value * f64::from((range.color >> 16) & 0xFF) / 255.0;
            acc[1] += value * f64::from((range.color >> 8) & 0xFF) / 255.0;
            acc[2] += value * f64::from(range.color & 0xFF) / 255.0;
        }
        image::Rgb([
            (acc[0].clamp(0.0, 1.0) * 255.0).round() as u8,
            (acc[1].clamp(0.0, 1.0) * 255.0).round() as u8,
            (acc[2].clamp(0.0, 1.0) * 255.0).round() as u8,
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_export_core::domain::{ChannelInfo, PixelBuffer};

    #[test]
    fn test_full_domain_ranges_by_format() {
        let mut descriptor = SlideDescriptor {
            width: 1,
            height: 1,
            channels: vec![ChannelInfo::new("Gray", 0xFFFF_FFFF)],
            bit_depth: 16,
            is_float: false,
        };
        assert!((full_domain_ranges(&descriptor)[0].max_display - 65535.0).abs() < f64::EPSILON);

        descriptor.is_float = true;
        assert!((full_domain_ranges(&descriptor)[0].max_display - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_compose_rgb_white_channel_saturates() {
        let region = Region {
            width: 1,
            height: 1,
            channels: 1,
            pixels: PixelBuffer::U8(vec![200]),
        };
        let ranges = vec![ChannelRange {
            name: "Gray".into(),
            color: 0xFFFF_FFFF,
            min_display: 0.0,
            max_display: 100.0,
        }];
        let composed = compose_rgb(&region, &ranges);
        assert_eq!(composed.get_pixel(0, 0).0, [255, 255, 255]);
    }
}
