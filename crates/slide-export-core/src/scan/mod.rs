//! Global range scanning: histograms, percentile resolution, batch scan.

mod histogram;
mod ranges;

pub use histogram::{BinMapping, Histogram};
pub use ranges::{RangeScanner, CONTINUOUS_BIN_COUNT};
