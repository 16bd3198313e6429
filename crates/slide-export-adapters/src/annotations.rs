//! Sidecar annotation export.

use std::path::PathBuf;

use anyhow::Context;
use serde_json::{json, Value};
use slide_export_core::ports::{AnnotationExporter, SlideHandle};
use tracing::debug;

/// Exports annotations that travel as GeoJSON sidecar files next to the
/// source slides.
///
/// Looks for `{name}.annotations.json` in the configured search
/// directories, validates it parses, and writes the normalized document
/// into the output directory; slides without a sidecar get an empty
/// FeatureCollection so downstream tooling always finds a file.
pub struct SidecarAnnotationExporter {
    search_dirs: Vec<PathBuf>,
    output_dir: PathBuf,
}

impl SidecarAnnotationExporter {
    /// Creates an exporter searching `search_dirs` and writing into
    /// `output_dir`.
    #[must_use]
    pub const fn new(search_dirs: Vec<PathBuf>, output_dir: PathBuf) -> Self {
        Self {
            search_dirs,
            output_dir,
        }
    }

    fn find_sidecar(&self, name: &str) -> Option<PathBuf> {
        self.search_dirs
            .iter()
            .map(|dir| dir.join(format!("{name}.annotations.json")))
            .find(|path| path.is_file())
    }
}

impl AnnotationExporter for SidecarAnnotationExporter {
    fn export(&self, _slide: &dyn SlideHandle, name: &str) -> anyhow::Result<()> {
        let document = match self.find_sidecar(name) {
            Some(path) => {
                debug!("Found annotation sidecar: {}", path.display());
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str::<Value>(&content)
                    .with_context(|| format!("Invalid annotation JSON: {}", path.display()))?
            }
            None => json!({ "type": "FeatureCollection", "features": [] }),
        };

        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;
        let out = self.output_dir.join(format!("{name}.annotations.json"));
        std::fs::write(&out, serde_json::to_string_pretty(&document)?)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_export_core::domain::BatchItem;
    use slide_export_core::ports::SlideSource;
    use slide_export_test_support::{MockSlideSource, SyntheticSlideBuilder};

    fn open_slide() -> Box<dyn SlideHandle> {
        let (descriptor, region) = SyntheticSlideBuilder::uniform_u8(2, 2, 0);
        let source = MockSlideSource::new().with_slide("s", descriptor, region);
        source.open(&BatchItem::new("s.tif", "s")).expect("open")
    }

    #[test]
    fn test_missing_sidecar_writes_empty_collection() {
        let input = tempfile::tempdir().expect("tempdir");
        let output = tempfile::tempdir().expect("tempdir");
        let exporter = SidecarAnnotationExporter::new(
            vec![input.path().to_path_buf()],
            output.path().to_path_buf(),
        );

        exporter.export(open_slide().as_ref(), "s").expect("export");

        let written: Value = serde_json::from_str(
            &std::fs::read_to_string(output.path().join("s.annotations.json")).unwrap(),
        )
        .expect("parse");
        assert_eq!(written["type"], "FeatureCollection");
        assert_eq!(written["features"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_existing_sidecar_is_carried_over() {
        let input = tempfile::tempdir().expect("tempdir");
        let output = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            input.path().join("s.annotations.json"),
            r#"{"type":"FeatureCollection","features":[{"type":"Feature"}]}"#,
        )
        .expect("write sidecar");

        let exporter = SidecarAnnotationExporter::new(
            vec![input.path().to_path_buf()],
            output.path().to_path_buf(),
        );
        exporter.export(open_slide().as_ref(), "s").expect("export");

        let written: Value = serde_json::from_str(
            &std::fs::read_to_string(output.path().join("s.annotations.json")).unwrap(),
        )
        .expect("parse");
        assert_eq!(written["features"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_sidecar_is_an_error() {
        let input = tempfile::tempdir().expect("tempdir");
        let output = tempfile::tempdir().expect("tempdir");
        std::fs::write(input.path().join("s.annotations.json"), "not json").expect("write");

        let exporter = SidecarAnnotationExporter::new(
            vec![input.path().to_path_buf()],
            output.path().to_path_buf(),
        );
        assert!(exporter.export(open_slide().as_ref(), "s").is_err());
    }
}
