//! Per-channel display range types.

use serde::{Deserialize, Serialize};

/// A computed display range for one channel, ordered by channel index.
///
/// Produced once per scan and never mutated afterwards. `max_display` is
/// always strictly greater than `min_display`; a degenerate histogram gets
/// its upper bound bumped by one bin unit before construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRange {
    /// Channel name as reported by the slide.
    pub name: String,
    /// Packed ARGB display color of the channel.
    pub color: u32,
    /// Lower display bound.
    pub min_display: f64,
    /// Upper display bound, strictly greater than `min_display`.
    pub max_display: f64,
}

impl ChannelRange {
    /// Width of the range.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_display - self.min_display
    }

    /// Normalizes a sample into `[0, 1]` against this range.
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        ((value - self.min_display) / self.width()).clamp(0.0, 1.0)
    }
}
