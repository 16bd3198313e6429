//! Slide Export Adapters - concrete implementations of the core ports.
//!
//! Filesystem slide loading through the `image` crate, the four export
//! strategies (rendered, mask, raw, tiled), sidecar annotation export and
//! JSON reproducibility recording.

mod annotations;
pub mod exporters;
mod fs;
mod recorder;

pub use annotations::SidecarAnnotationExporter;
pub use exporters::{
    MaskExporter, RawExporter, RenderedExporter, TiledExporter, DEFAULT_TILE_SIZE,
};
pub use fs::FsSlideSource;
pub use recorder::JsonStepRecorder;
