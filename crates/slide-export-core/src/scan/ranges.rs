//! Global per-channel range computation over a slide batch.

use tracing::{debug, error, warn};

use crate::domain::{BatchItem, ChannelRange, Region, SlideDescriptor};
use crate::ports::{ProgressSink, SlideSource};
use crate::scan::{BinMapping, Histogram};

/// Bin count used for continuous (floating point) pixel domains.
pub const CONTINUOUS_BIN_COUNT: usize = 10_000;

/// Computes percentile-clipped per-channel display ranges across a batch.
///
/// Memory is bounded by `channels × bin_count` regardless of image size or
/// count. The scan reads every slide at a reduced resolution; percentile
/// estimation tolerates the sampling noise.
pub struct RangeScanner<'a> {
    source: &'a dyn SlideSource,
    progress: Option<&'a dyn ProgressSink>,
}

impl<'a> RangeScanner<'a> {
    /// Creates a scanner over `source`.
    #[must_use]
    pub fn new(source: &'a dyn SlideSource) -> Self {
        Self {
            source,
            progress: None,
        }
    }

    /// Attaches a progress sink, invoked once per image per pass.
    #[must_use]
    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Computes one range per channel of the reference (first) slide.
    ///
    /// An empty batch yields an empty result. Failure to open the reference
    /// slide is fatal to the scan and also yields an empty result; failures
    /// on individual slides afterwards are logged and that slide's
    /// contribution is simply absent.
    #[must_use]
    pub fn compute_global_ranges(
        &self,
        items: &[BatchItem],
        clip_percentile: f64,
        downsample: f64,
    ) -> Vec<ChannelRange> {
        let Some(reference) = items.first() else {
            return Vec::new();
        };

        let descriptor = match self.read_descriptor(reference) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                error!(
                    "range scan aborted, cannot open reference slide {}: {e:#}",
                    reference.name
                );
                return Vec::new();
            }
        };

        if descriptor.is_float {
            self.scan_continuous(items, &descriptor, clip_percentile, downsample)
        } else {
            self.scan_discrete(items, &descriptor, clip_percentile, downsample)
        }
    }

    /// Opens the reference slide just long enough to read its metadata.
    fn read_descriptor(&self, item: &BatchItem) -> anyhow::Result<SlideDescriptor> {
        let mut handle = self.source.open(item)?;
        let descriptor = handle.descriptor().clone();
        if let Err(e) = handle.close() {
            warn!("failed to close reference slide {}: {e:#}", item.name);
        }
        Ok(descriptor)
    }

    /// Single-pass exact histogram scan for fixed-bit-depth slides.
    fn scan_discrete(
        &self,
        items: &[BatchItem],
        descriptor: &SlideDescriptor,
        clip_percentile: f64,
        downsample: f64,
    ) -> Vec<ChannelRange> {
        let bins = descriptor.bin_capacity();
        let channels = descriptor.channel_count();
        let mut histograms: Vec<Histogram> = (0..channels).map(|_| Histogram::new(bins)).collect();

        for (index, item) in items.iter().enumerate() {
            match self.read_downsampled(item, downsample) {
                Ok(region) => {
                    let used = channels.min(region.channels);
                    for pixel in 0..region.pixel_count() {
                        for (channel, histogram) in histograms.iter_mut().take(used).enumerate() {
                            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                            histogram.record(region.sample(pixel, channel) as usize);
                        }
                    }
                }
                Err(e) => warn!("skipping {} during range scan: {e:#}", item.name),
            }
            self.report(index + 1, items.len());
        }

        descriptor
            .channels
            .iter()
            .zip(&histograms)
            .map(|(info, histogram)| {
                let (low, high) = resolve_bounds(histogram, clip_percentile);
                #[allow(clippy::cast_precision_loss)]
                let min_display = low as f64;
                #[allow(clippy::cast_precision_loss)]
                let mut max_display = high as f64;
                if max_display <= min_display {
                    max_display = min_display + 1.0;
                }
                debug!(
                    "channel {}: display range {min_display}..{max_display}",
                    info.name
                );
                ChannelRange {
                    name: info.name.clone(),
                    color: info.color,
                    min_display,
                    max_display,
                }
            })
            .collect()
    }

    /// Two-pass scan for floating point slides: global min/max, then a
    /// binned histogram over the discovered range.
    fn scan_continuous(
        &self,
        items: &[BatchItem],
        descriptor: &SlideDescriptor,
        clip_percentile: f64,
        downsample: f64,
    ) -> Vec<ChannelRange> {
        let channels = descriptor.channel_count();
        let total_units = items.len() * 2;

        // Pass 1: true per-channel minimum and maximum across the batch.
        let mut minima = vec![f64::INFINITY; channels];
        let mut maxima = vec![f64::NEG_INFINITY; channels];
        for (index, item) in items.iter().enumerate() {
            match self.read_downsampled(item, downsample) {
                Ok(region) => {
                    let used = channels.min(region.channels);
                    for pixel in 0..region.pixel_count() {
                        for channel in 0..used {
                            let value = region.sample(pixel, channel);
                            if value.is_finite() {
                                minima[channel] = minima[channel].min(value);
                                maxima[channel] = maxima[channel].max(value);
                            }
                        }
                    }
                }
                Err(e) => warn!("skipping {} during min/max pass: {e:#}", item.name),
            }
            self.report(index + 1, total_units);
        }

        let mappings: Vec<BinMapping> = (0..channels)
            .map(|channel| {
                if minima[channel].is_finite() {
                    BinMapping::new(minima[channel], maxima[channel], CONTINUOUS_BIN_COUNT)
                } else {
                    // No finite sample reached this channel in pass 1.
                    BinMapping::new(0.0, 0.0, CONTINUOUS_BIN_COUNT)
                }
            })
            .collect();

        // Pass 2: bin every finite sample over the discovered range.
        let mut histograms: Vec<Histogram> = (0..channels)
            .map(|_| Histogram::new(CONTINUOUS_BIN_COUNT))
            .collect();
        for (index, item) in items.iter().enumerate() {
            match self.read_downsampled(item, downsample) {
                Ok(region) => {
                    let used = channels.min(region.channels);
                    for pixel in 0..region.pixel_count() {
                        for channel in 0..used {
                            if let Some(bin) =
                                mappings[channel].bin_for(region.sample(pixel, channel))
                            {
                                histograms[channel].record(bin);
                            }
                        }
                    }
                }
                Err(e) => warn!("skipping {} during histogram pass: {e:#}", item.name),
            }
            self.report(items.len() + index + 1, total_units);
        }

        descriptor
            .channels
            .iter()
            .zip(histograms.iter().zip(&mappings))
            .map(|(info, (histogram, mapping))| {
                let (low, high) = resolve_bounds(histogram, clip_percentile);
                let min_display = mapping.value_for(low);
                let mut max_display = mapping.value_for(high);
                if max_display <= min_display {
                    max_display = min_display + mapping.width();
                }
                debug!(
                    "channel {}: display range {min_display}..{max_display}",
                    info.name
                );
                ChannelRange {
                    name: info.name.clone(),
                    color: info.color,
                    min_display,
                    max_display,
                }
            })
            .collect()
    }

    /// Opens, reads and closes one slide at the scan downsample.
    fn read_downsampled(&self, item: &BatchItem, downsample: f64) -> anyhow::Result<Region> {
        let mut handle = self.source.open(item)?;
        let region = handle.read_region(downsample);
        if let Err(e) = handle.close() {
            warn!("failed to close {} after scan read: {e:#}", item.name);
        }
        region
    }

    fn report(&self, done: usize, total: usize) {
        if let Some(progress) = self.progress {
            progress.update(done, total);
        }
    }
}

/// Percentile resolution with the empty-histogram bypass.
///
/// A histogram that saw no samples yields the full bin domain.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn resolve_bounds(histogram: &Histogram, clip_percentile: f64) -> (usize, usize) {
    if histogram.is_empty() {
        return (0, histogram.bin_count() - 1);
    }
    let clip_count = (histogram.total() as f64 * clip_percentile / 100.0) as u64;
    histogram.clip_bounds(clip_count)
}
