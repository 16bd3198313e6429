//! Reproducibility recording port.

use crate::domain::BatchItem;

/// Port for attaching a named workflow step to an item's persisted history.
///
/// Invoked only on successful export when enabled; a recording failure is
/// logged by the runner and never reclassifies the item.
pub trait StepRecorder: Send + Sync {
    /// Appends a named step carrying the generating script.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    fn record(&self, item: &BatchItem, step_name: &str, script: &str) -> anyhow::Result<()>;
}
