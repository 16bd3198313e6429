//! Export error taxonomy.

use thiserror::Error;

/// Outcome classification for a single item's export.
///
/// The runner maps `Incompatible` to a skip and everything else to a
/// failure; collaborators must pick the variant accordingly rather than
/// stringifying the distinction away.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The item is structurally incompatible with the selected export
    /// strategy. Expected in heterogeneous batches; benign.
    #[error("incompatible input: {0}")]
    Incompatible(String),

    /// Anything else that went wrong during export.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl ExportError {
    /// Shorthand for an incompatibility.
    pub fn incompatible(reason: impl Into<String>) -> Self {
        Self::Incompatible(reason.into())
    }

    /// Whether this error should count as a skip rather than a failure.
    #[must_use]
    pub const fn is_incompatible(&self) -> bool {
        matches!(self, Self::Incompatible(_))
    }
}
