//! The sequential, cancellable batch export loop.

use tracing::{error, info, warn};

use crate::domain::{BatchItem, ExportError, ExportTally};
use crate::ports::{
    AnnotationExporter, CancelToken, ExportStrategy, ProgressSink, SlideSource, StepRecorder,
};

/// Per-batch switches for the optional sub-steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Run the annotation exporter after each successful main export step.
    pub export_annotations: bool,
    /// Attach a reproducibility record to each successfully exported item.
    pub record_steps: bool,
}

/// Drives a batch of items through one export strategy, item by item.
///
/// Strictly sequential: per-item resources are heavyweight decoders and
/// failure isolation depends on completing full open→export→close cycles
/// one at a time. The only state shared with other threads is the progress
/// sink and the cancel token.
pub struct BatchRunner<'a> {
    source: &'a dyn SlideSource,
    strategy: &'a dyn ExportStrategy,
    options: BatchOptions,
    annotations: Option<&'a dyn AnnotationExporter>,
    recorder: Option<&'a dyn StepRecorder>,
    progress: Option<&'a dyn ProgressSink>,
    cancel: CancelToken,
}

impl<'a> BatchRunner<'a> {
    /// Creates a runner over `source` using `strategy` for every item.
    #[must_use]
    pub fn new(
        source: &'a dyn SlideSource,
        strategy: &'a dyn ExportStrategy,
        options: BatchOptions,
    ) -> Self {
        Self {
            source,
            strategy,
            options,
            annotations: None,
            recorder: None,
            progress: None,
            cancel: CancelToken::new(),
        }
    }

    /// Attaches the annotation exporter used when
    /// [`BatchOptions::export_annotations`] is set.
    #[must_use]
    pub fn with_annotations(mut self, annotations: &'a dyn AnnotationExporter) -> Self {
        self.annotations = Some(annotations);
        self
    }

    /// Attaches the reproducibility recorder used when
    /// [`BatchOptions::record_steps`] is set.
    #[must_use]
    pub fn with_recorder(mut self, recorder: &'a dyn StepRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Attaches a progress sink.
    #[must_use]
    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Uses a caller-held cancel token instead of a private one.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels this runner.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Processes every item in order and returns the final tally.
    ///
    /// A single item failing never aborts the batch; only cancellation
    /// stops the loop early, and items never started are not counted.
    pub fn run(&self, items: &[BatchItem]) -> ExportTally {
        let total = items.len();
        let mut tally = ExportTally::new();

        for (index, item) in items.iter().enumerate() {
            // The one cancellation point: never interrupts an in-flight item.
            if self.cancel.is_cancelled() {
                tally.cancelled = true;
                break;
            }

            self.report(index, total);
            self.set_status(&format!("Exporting {} ({}/{total})", item.name, index + 1));

            self.process_item(item, &mut tally);
        }

        self.report(total, total);
        if tally.cancelled {
            self.set_status(&format!(
                "Cancelled after {} of {total} items",
                tally.processed()
            ));
            info!("batch cancelled after {} of {total} items", tally.processed());
        } else {
            self.set_status(&format!(
                "Done: {} succeeded, {} failed, {} skipped",
                tally.succeeded, tally.failed, tally.skipped
            ));
            info!(
                "batch complete: {} succeeded, {} failed, {} skipped",
                tally.succeeded, tally.failed, tally.skipped
            );
        }

        tally
    }

    /// One full open→export→close cycle, mutating the tally exactly once.
    fn process_item(&self, item: &BatchItem, tally: &mut ExportTally) {
        let mut handle = match self.source.open(item) {
            Ok(handle) => handle,
            Err(e) => {
                error!("failed to open {}: {e:#}", item.name);
                tally.record_failure(&item.name, &format!("{e:#}"));
                return;
            }
        };

        match self.strategy.export(handle.as_mut(), &item.name) {
            Ok(()) => {
                // Orthogonal best-effort step; never changes the
                // classification.
                if self.options.export_annotations {
                    if let Some(annotations) = self.annotations {
                        if let Err(e) = annotations.export(handle.as_ref(), &item.name) {
                            warn!("annotation export for {} failed: {e:#}", item.name);
                        }
                    }
                }

                tally.record_success();
                if self.options.record_steps {
                    self.record_step(item);
                }
            }
            Err(ExportError::Incompatible(reason)) => {
                warn!("skipping {}: {reason}", item.name);
                tally.record_skip(&item.name, &reason);
            }
            Err(ExportError::Failed(e)) => {
                error!("export of {} failed: {e:#}", item.name);
                tally.record_failure(&item.name, &format!("{e:#}"));
            }
        }

        if let Err(e) = handle.close() {
            warn!("failed to close {}: {e:#}", item.name);
        }
    }

    /// Best-effort reproducibility record for a successful export.
    fn record_step(&self, item: &BatchItem) {
        if let Some(recorder) = self.recorder {
            let step_name = format!("{} export", self.strategy.kind());
            if let Err(e) = recorder.record(item, &step_name, &self.strategy.step_script()) {
                warn!("failed to record step for {}: {e:#}", item.name);
            }
        }
    }

    fn report(&self, done: usize, total: usize) {
        if let Some(progress) = self.progress {
            progress.update(done, total);
        }
    }

    fn set_status(&self, message: &str) {
        if let Some(progress) = self.progress {
            progress.status(message);
        }
    }
}
