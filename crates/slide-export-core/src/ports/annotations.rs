//! Annotation export port.

use crate::ports::SlideHandle;

/// Port for the best-effort annotation export step.
///
/// Runs after the main export when enabled; failures are logged by the
/// runner and never affect the item's outcome. The output location is
/// captured by the implementation at construction time.
pub trait AnnotationExporter: Send + Sync {
    /// Exports annotations for one slide.
    ///
    /// # Errors
    ///
    /// Returns an error if annotations cannot be written.
    fn export(&self, slide: &dyn SlideHandle, name: &str) -> anyhow::Result<()>;
}
