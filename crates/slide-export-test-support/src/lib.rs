//! Test support for slide-export: mock ports and synthetic slides.

mod builders;
mod mocks;

pub use builders::SyntheticSlideBuilder;
pub use mocks::{
    CountingProgressSink, MockAnnotationExporter, MockSlideSource, MockStepRecorder,
    ScriptedExporter, ScriptedOutcome, SlideBehavior,
};
