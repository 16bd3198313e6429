//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the engine core and external
//! adapters: slide decoding, export encoding, annotation export, progress
//! reporting and reproducibility recording.

mod annotations;
mod export;
mod progress;
mod recorder;
mod slide_source;

pub use annotations::AnnotationExporter;
pub use export::ExportStrategy;
pub use progress::{CancelToken, ProgressSink};
pub use recorder::StepRecorder;
pub use slide_source::{SlideHandle, SlideSource};
