//! Progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Port for receiving progress and status updates.
///
/// Write-only from the engine's perspective. Implementations must be safe
/// to call from the worker thread while another thread observes whatever
/// they publish; readers only ever need the latest value.
pub trait ProgressSink: Send + Sync {
    /// Reports fractional progress as `(done, total)` work units.
    fn update(&self, done: usize, total: usize);

    /// Publishes a human-readable status line.
    fn status(&self, message: &str);
}

/// Shared cooperative cancellation flag.
///
/// Cloneable across threads; the worker checks it at one well-defined point
/// per iteration and never interrupts an in-flight item.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
