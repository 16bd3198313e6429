//! Raw sample dump export.

use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use slide_export_core::domain::{ExportError, PixelBuffer, Region};
use slide_export_core::ports::{ExportStrategy, SlideHandle};

/// Header written next to every raw dump.
#[derive(Serialize)]
struct RawHeader<'a> {
    width: u32,
    height: u32,
    channels: Vec<&'a str>,
    bit_depth: u8,
    is_float: bool,
    downsample: f64,
    layout: &'static str,
    byte_order: &'static str,
}

/// Dumps a slide region as channel-planar little-endian samples plus a
/// JSON header describing the layout.
pub struct RawExporter {
    output_dir: PathBuf,
    downsample: f64,
}

impl RawExporter {
    /// Creates an exporter writing `{name}.raw` / `{name}.json` pairs into
    /// `output_dir`.
    #[must_use]
    pub const fn new(output_dir: PathBuf, downsample: f64) -> Self {
        Self {
            output_dir,
            downsample,
        }
    }
}

impl ExportStrategy for RawExporter {
    fn kind(&self) -> &'static str {
        "raw"
    }

    fn export(&self, slide: &mut dyn SlideHandle, name: &str) -> Result<(), ExportError> {
        let descriptor = slide.descriptor().clone();
        let region = slide.read_region(self.downsample)?;

        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;

        let raw_path = self.output_dir.join(format!("{name}.raw"));
        let file = std::fs::File::create(&raw_path)
            .with_context(|| format!("Failed to create {}", raw_path.display()))?;
        let mut writer = BufWriter::new(file);
        write_planar(&mut writer, &region).with_context(|| {
            format!("Failed to write samples to {}", raw_path.display())
        })?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", raw_path.display()))?;

        let header = RawHeader {
            width: region.width,
            height: region.height,
            channels: descriptor.channels.iter().map(|c| c.name.as_str()).collect(),
            bit_depth: descriptor.bit_depth,
            is_float: descriptor.is_float,
            downsample: self.downsample,
            layout: "planar",
            byte_order: "little-endian",
        };
        let header_path = self.output_dir.join(format!("{name}.json"));
        let json = serde_json::to_string_pretty(&header).context("Failed to encode header")?;
        std::fs::write(&header_path, json)
            .with_context(|| format!("Failed to write {}", header_path.display()))?;
        Ok(())
    }

    fn step_script(&self) -> String {
        format!(
            "slide-export export --format raw --downsample {} --output {}",
            self.downsample,
            self.output_dir.display()
        )
    }
}

/// Writes the region channel-by-channel in row-major order.
fn write_planar(writer: &mut impl Write, region: &Region) -> std::io::Result<()> {
    for channel in 0..region.channels {
        for pixel in 0..region.pixel_count() {
            let idx = pixel * region.channels + channel;
            match &region.pixels {
                PixelBuffer::U8(data) => writer.write_all(&[data[idx]])?,
                PixelBuffer::U16(data) => writer.write_all(&data[idx].to_le_bytes())?,
                PixelBuffer::F32(data) => writer.write_all(&data[idx].to_le_bytes())?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_export_core::domain::BatchItem;
    use slide_export_core::ports::SlideSource;
    use slide_export_test_support::{MockSlideSource, SyntheticSlideBuilder};

    #[test]
    fn test_raw_dump_and_header() {
        let (descriptor, region) = SyntheticSlideBuilder::from_samples_u8(2, 1, vec![5, 9]);
        let source = MockSlideSource::new().with_slide("r", descriptor, region);
        let mut handle = source.open(&BatchItem::new("r.tif", "r")).expect("open");

        let dir = tempfile::tempdir().expect("tempdir");
        let exporter = RawExporter::new(dir.path().to_path_buf(), 1.0);
        exporter.export(handle.as_mut(), "r").expect("export");

        let bytes = std::fs::read(dir.path().join("r.raw")).expect("read raw");
        assert_eq!(bytes, vec![5, 9]);

        let header: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("r.json")).unwrap())
                .expect("parse header");
        assert_eq!(header["width"], 2);
        assert_eq!(header["channels"][0], "Gray");
        assert_eq!(header["layout"], "planar");
    }

    #[test]
    fn test_planar_interleaving_order() {
        // Two pixels, two channels: interleaved [a0 b0 a1 b1] becomes
        // planar [a0 a1 b0 b1].
        let region = Region {
            width: 2,
            height: 1,
            channels: 2,
            pixels: PixelBuffer::U8(vec![1, 10, 2, 20]),
        };
        let mut out = Vec::new();
        write_planar(&mut out, &region).expect("write");
        assert_eq!(out, vec![1, 2, 10, 20]);
    }
}
