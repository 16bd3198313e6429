//! Slide Export Core - Batch export engine and global range scanner
//!
//! This crate contains the core domain types, the port traits that bound the
//! engine, the histogram/percentile math, and the two driving components:
//! the cancellable batch job runner and the global pixel range scanner.

pub mod domain;
pub mod ports;
pub mod runner;
pub mod scan;

pub use domain::{
    BatchItem, ChannelInfo, ChannelRange, ExportError, ExportTally, PixelBuffer, Region,
    SlideDescriptor,
};
pub use ports::{
    AnnotationExporter, CancelToken, ExportStrategy, ProgressSink, SlideHandle, SlideSource,
    StepRecorder,
};
pub use runner::{BatchOptions, BatchRunner};
pub use scan::{BinMapping, Histogram, RangeScanner, CONTINUOUS_BIN_COUNT};
