//! Synthetic slide builders for testing.

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use slide_export_core::domain::{ChannelInfo, PixelBuffer, Region, SlideDescriptor};

/// Builder for in-memory synthetic slides and raster test images.
///
/// Mock-slide variants return `(SlideDescriptor, Region)` pairs for the
/// port mocks; raster variants return `image::DynamicImage` for tests that
/// go through the filesystem adapter or the CLI binary.
pub struct SyntheticSlideBuilder;

impl SyntheticSlideBuilder {
    /// Gray 8-bit descriptor of the given size.
    #[must_use]
    pub fn gray_descriptor(width: u32, height: u32) -> SlideDescriptor {
        SlideDescriptor {
            width,
            height,
            channels: vec![ChannelInfo::new("Gray", 0xFFFF_FFFF)],
            bit_depth: 8,
            is_float: false,
        }
    }

    /// Gray 16-bit descriptor of the given size.
    #[must_use]
    pub fn gray16_descriptor(width: u32, height: u32) -> SlideDescriptor {
        SlideDescriptor {
            bit_depth: 16,
            ..Self::gray_descriptor(width, height)
        }
    }

    /// Single-channel float descriptor of the given size.
    #[must_use]
    pub fn float_descriptor(width: u32, height: u32) -> SlideDescriptor {
        SlideDescriptor {
            is_float: true,
            bit_depth: 32,
            ..Self::gray_descriptor(width, height)
        }
    }

    /// Single-channel 8-bit slide where every pixel is `value`.
    #[must_use]
    pub fn uniform_u8(width: u32, height: u32, value: u8) -> (SlideDescriptor, Region) {
        let region = Region {
            width,
            height,
            channels: 1,
            pixels: PixelBuffer::U8(vec![value; (width * height) as usize]),
        };
        (Self::gray_descriptor(width, height), region)
    }

    /// Single-channel 8-bit slide from explicit samples.
    ///
    /// # Panics
    ///
    /// Panics if the sample count does not match `width * height`.
    #[must_use]
    pub fn from_samples_u8(width: u32, height: u32, samples: Vec<u8>) -> (SlideDescriptor, Region) {
        assert_eq!(samples.len(), (width * height) as usize);
        let region = Region {
            width,
            height,
            channels: 1,
            pixels: PixelBuffer::U8(samples),
        };
        (Self::gray_descriptor(width, height), region)
    }

    /// Single-channel float slide from explicit samples (NaN welcome).
    ///
    /// # Panics
    ///
    /// Panics if the sample count does not match `width * height`.
    #[must_use]
    pub fn from_samples_f32(
        width: u32,
        height: u32,
        samples: Vec<f32>,
    ) -> (SlideDescriptor, Region) {
        assert_eq!(samples.len(), (width * height) as usize);
        let region = Region {
            width,
            height,
            channels: 1,
            pixels: PixelBuffer::F32(samples),
        };
        (Self::float_descriptor(width, height), region)
    }

    // === Raster images for adapter/CLI tests ===

    /// Uniform grayscale raster.
    #[must_use]
    pub fn uniform_gray_image(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |_, _| Luma([value])))
    }

    /// Horizontal grayscale gradient raster.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn gradient_gray_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, _| {
            Luma([((u32::from(u8::MAX) * x) / width.max(1)) as u8])
        }))
    }

    /// RGB raster with fixed channel values.
    #[must_use]
    pub fn rgb_image(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, _| image::Rgb(rgb)))
    }
}
