//! Batch outcome accounting.

use serde::Serialize;

/// Accumulated outcome of one batch export run.
///
/// Mutated exactly once per processed item; read-only once the batch loop
/// ends or is cancelled. `succeeded + failed + skipped` equals the item
/// count unless the run was cancelled, in which case unstarted items are
/// simply never counted.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExportTally {
    /// Items exported without error.
    pub succeeded: usize,
    /// Items whose export raised an unexpected error.
    pub failed: usize,
    /// Items structurally incompatible with the selected export.
    pub skipped: usize,
    /// One `"{name}: {message}"` entry per failed or skipped item, in
    /// batch order.
    pub errors: Vec<String>,
    /// Whether the batch was cancelled before reaching the last item.
    pub cancelled: bool,
}

impl ExportTally {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful export.
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    /// Records a failed export with its error message.
    pub fn record_failure(&mut self, name: &str, message: &str) {
        self.failed += 1;
        self.errors.push(format!("{name}: {message}"));
    }

    /// Records a skipped (incompatible) item with the reason.
    pub fn record_skip(&mut self, name: &str, message: &str) {
        self.skipped += 1;
        self.errors.push(format!("{name}: {message}"));
    }

    /// Total number of items that were actually processed.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }

    /// Whether every processed item succeeded.
    ///
    /// Skips are benign and do not count against a clean run.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }
}
