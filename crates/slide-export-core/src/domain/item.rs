//! Batch input items.

use std::path::{Path, PathBuf};

/// A reference to one source slide plus its display name.
///
/// Read-only input to the batch loop; the loop owns the lifecycle of any
/// heavyweight handle it opens for the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    /// Location of the slide, interpreted by the slide source.
    pub path: PathBuf,
    /// Human-readable name used in progress, logs and error entries.
    pub name: String,
}

impl BatchItem {
    /// Creates an item with an explicit display name.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Creates an item named after the path's file stem.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map_or_else(|| path.to_string_lossy().into_owned(), |s| {
                s.to_string_lossy().into_owned()
            });
        Self { path, name }
    }
}

impl From<&Path> for BatchItem {
    fn from(path: &Path) -> Self {
        Self::from_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_stem() {
        let item = BatchItem::from_path("/data/slides/scan_042.ome.tif");
        assert_eq!(item.name, "scan_042.ome");
    }

    #[test]
    fn test_explicit_name() {
        let item = BatchItem::new("/data/a.tif", "Slide A");
        assert_eq!(item.name, "Slide A");
    }
}
