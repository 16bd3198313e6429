//! Slide source port for opening image resources.

use crate::domain::{BatchItem, Region, SlideDescriptor};

/// Port for opening slides referenced by batch items.
pub trait SlideSource: Send + Sync {
    /// Opens the slide behind `item`, returning a heavyweight handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the slide cannot be located or decoded.
    fn open(&self, item: &BatchItem) -> anyhow::Result<Box<dyn SlideHandle>>;
}

/// A heavyweight, explicitly-closed handle to one open slide.
///
/// The batch loop opens a handle at the start of an item and closes it on
/// every exit path before moving on; `close` exists as an explicit
/// operation (rather than relying on `Drop`) so close failures can be
/// observed and logged.
pub trait SlideHandle: Send {
    /// Metadata discovered when the slide was opened.
    fn descriptor(&self) -> &SlideDescriptor;

    /// Reads the whole slide at `downsample` (a ratio > 1 reduces
    /// resolution).
    ///
    /// # Errors
    ///
    /// Returns an error if pixel data cannot be read or decoded.
    fn read_region(&mut self, downsample: f64) -> anyhow::Result<Region>;

    /// Releases the handle's resources.
    ///
    /// # Errors
    ///
    /// Returns an error if teardown fails; callers log and continue.
    fn close(&mut self) -> anyhow::Result<()>;
}
