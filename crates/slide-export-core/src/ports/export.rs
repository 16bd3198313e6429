//! Export strategy port.

use crate::domain::ExportError;
use crate::ports::SlideHandle;

/// Port for one pluggable per-item export step.
///
/// The runner depends on exactly one capability: export this item, and
/// signal incompatibility distinctly from failure. Which concrete strategy
/// runs (rendered, mask, raw, tiled) is selected once per batch by the
/// caller.
pub trait ExportStrategy: Send + Sync {
    /// Short identifier used in logs and reproducibility records.
    fn kind(&self) -> &'static str;

    /// Exports one slide.
    ///
    /// # Errors
    ///
    /// `ExportError::Incompatible` when the slide cannot structurally be
    /// processed by this strategy; any other error for real failures.
    fn export(&self, slide: &mut dyn SlideHandle, name: &str) -> Result<(), ExportError>;

    /// Script text that reproduces this export, recorded against an item
    /// on success when step recording is enabled.
    fn step_script(&self) -> String;
}
