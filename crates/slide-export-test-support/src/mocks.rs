//! Mock implementations of core port traits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use slide_export_core::domain::{BatchItem, ExportError, Region, SlideDescriptor};
use slide_export_core::ports::{
    AnnotationExporter, CancelToken, ExportStrategy, ProgressSink, SlideHandle, SlideSource,
    StepRecorder,
};

/// How a mock slide behaves when the engine touches it.
#[derive(Debug, Clone)]
pub enum SlideBehavior {
    /// Opens, reads and closes normally.
    Normal {
        /// Metadata reported on open.
        descriptor: SlideDescriptor,
        /// Region returned from every read.
        region: Region,
    },
    /// `open` fails.
    FailOpen,
    /// Opens fine but every region read fails.
    FailRead {
        /// Metadata reported on open.
        descriptor: SlideDescriptor,
    },
    /// Works normally but `close` reports an error (still counted).
    FailClose {
        /// Metadata reported on open.
        descriptor: SlideDescriptor,
        /// Region returned from every read.
        region: Region,
    },
}

/// Mock implementation of `SlideSource`.
///
/// Yields pre-scripted slides by item name and tracks open/close calls for
/// assertions.
#[derive(Default)]
pub struct MockSlideSource {
    slides: HashMap<String, SlideBehavior>,
    opens: Arc<Mutex<HashMap<String, usize>>>,
    closes: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockSlideSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a normally-behaving slide.
    #[must_use]
    pub fn with_slide(
        self,
        name: impl Into<String>,
        descriptor: SlideDescriptor,
        region: Region,
    ) -> Self {
        self.with_behavior(name, SlideBehavior::Normal { descriptor, region })
    }

    /// Adds a slide with explicit behavior.
    #[must_use]
    pub fn with_behavior(mut self, name: impl Into<String>, behavior: SlideBehavior) -> Self {
        self.slides.insert(name.into(), behavior);
        self
    }

    /// Number of times `open` succeeded for `name`.
    #[must_use]
    pub fn open_count(&self, name: &str) -> usize {
        *self
            .opens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .unwrap_or(&0)
    }

    /// Number of times `close` was called on a handle for `name`.
    #[must_use]
    pub fn close_count(&self, name: &str) -> usize {
        *self
            .closes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .unwrap_or(&0)
    }
}

impl SlideSource for MockSlideSource {
    fn open(&self, item: &BatchItem) -> anyhow::Result<Box<dyn SlideHandle>> {
        let behavior = self
            .slides
            .get(&item.name)
            .ok_or_else(|| anyhow::anyhow!("unknown slide: {}", item.name))?
            .clone();

        if matches!(behavior, SlideBehavior::FailOpen) {
            anyhow::bail!("scripted open failure: {}", item.name);
        }

        let mut opens = self.opens.lock().unwrap_or_else(PoisonError::into_inner);
        *opens.entry(item.name.clone()).or_insert(0) += 1;
        drop(opens);

        Ok(Box::new(MockSlideHandle {
            name: item.name.clone(),
            behavior,
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct MockSlideHandle {
    name: String,
    behavior: SlideBehavior,
    closes: Arc<Mutex<HashMap<String, usize>>>,
}

impl SlideHandle for MockSlideHandle {
    fn descriptor(&self) -> &SlideDescriptor {
        match &self.behavior {
            SlideBehavior::Normal { descriptor, .. }
            | SlideBehavior::FailRead { descriptor }
            | SlideBehavior::FailClose { descriptor, .. } => descriptor,
            SlideBehavior::FailOpen => unreachable!("FailOpen slides are never handed out"),
        }
    }

    fn read_region(&mut self, _downsample: f64) -> anyhow::Result<Region> {
        match &self.behavior {
            SlideBehavior::Normal { region, .. } | SlideBehavior::FailClose { region, .. } => {
                Ok(region.clone())
            }
            SlideBehavior::FailRead { .. } => {
                anyhow::bail!("scripted read failure: {}", self.name)
            }
            SlideBehavior::FailOpen => unreachable!(),
        }
    }

    fn close(&mut self) -> anyhow::Result<()> {
        let mut closes = self.closes.lock().unwrap_or_else(PoisonError::into_inner);
        *closes.entry(self.name.clone()).or_insert(0) += 1;
        drop(closes);

        if matches!(self.behavior, SlideBehavior::FailClose { .. }) {
            anyhow::bail!("scripted close failure: {}", self.name);
        }
        Ok(())
    }
}

/// Scripted per-item outcome for [`ScriptedExporter`].
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Export succeeds.
    Succeed,
    /// Export reports a structural incompatibility.
    Incompatible(String),
    /// Export fails with a generic error.
    Fail(String),
}

/// Mock export strategy with scripted per-item outcomes.
///
/// Items without a script succeed. Optionally cancels a token after a
/// given number of exports, for cancellation-mid-batch tests.
#[derive(Default)]
pub struct ScriptedExporter {
    outcomes: HashMap<String, ScriptedOutcome>,
    exported: Arc<Mutex<Vec<String>>>,
    cancel_after: Option<(CancelToken, usize)>,
}

impl ScriptedExporter {
    /// Creates an exporter that succeeds on everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the outcome for one item name.
    #[must_use]
    pub fn with_outcome(mut self, name: impl Into<String>, outcome: ScriptedOutcome) -> Self {
        self.outcomes.insert(name.into(), outcome);
        self
    }

    /// Cancels `token` once `count` items have gone through `export`.
    #[must_use]
    pub fn cancelling_after(mut self, token: CancelToken, count: usize) -> Self {
        self.cancel_after = Some((token, count));
        self
    }

    /// Names passed through `export`, in order.
    #[must_use]
    pub fn exported(&self) -> Vec<String> {
        self.exported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ExportStrategy for ScriptedExporter {
    fn kind(&self) -> &'static str {
        "scripted"
    }

    fn export(&self, _slide: &mut dyn SlideHandle, name: &str) -> Result<(), ExportError> {
        let mut exported = self.exported.lock().unwrap_or_else(PoisonError::into_inner);
        exported.push(name.to_owned());
        let count = exported.len();
        drop(exported);

        if let Some((token, after)) = &self.cancel_after {
            if count >= *after {
                token.cancel();
            }
        }

        match self.outcomes.get(name) {
            None | Some(ScriptedOutcome::Succeed) => Ok(()),
            Some(ScriptedOutcome::Incompatible(reason)) => {
                Err(ExportError::incompatible(reason.clone()))
            }
            Some(ScriptedOutcome::Fail(message)) => {
                Err(anyhow::anyhow!("{message}").into())
            }
        }
    }

    fn step_script(&self) -> String {
        "exportScripted()".to_owned()
    }
}

/// Mock progress sink capturing every update and status line.
#[derive(Default)]
pub struct CountingProgressSink {
    updates: Arc<Mutex<Vec<(usize, usize)>>>,
    statuses: Arc<Mutex<Vec<String>>>,
}

impl CountingProgressSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(done, total)` pairs, in order.
    #[must_use]
    pub fn updates(&self) -> Vec<(usize, usize)> {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All status lines, in order.
    #[must_use]
    pub fn statuses(&self) -> Vec<String> {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent `(done, total)` pair.
    #[must_use]
    pub fn last_update(&self) -> Option<(usize, usize)> {
        self.updates().last().copied()
    }
}

impl ProgressSink for CountingProgressSink {
    fn update(&self, done: usize, total: usize) {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((done, total));
    }

    fn status(&self, message: &str) {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }
}

/// Mock step recorder capturing records, optionally failing.
#[derive(Default)]
pub struct MockStepRecorder {
    records: Arc<Mutex<Vec<(String, String, String)>>>,
    fail: bool,
}

impl MockStepRecorder {
    /// Creates a recorder that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder whose `record` always fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            records: Arc::default(),
            fail: true,
        }
    }

    /// Captured `(item, step, script)` triples.
    #[must_use]
    pub fn records(&self) -> Vec<(String, String, String)> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StepRecorder for MockStepRecorder {
    fn record(&self, item: &BatchItem, step_name: &str, script: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("scripted recording failure");
        }
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((item.name.clone(), step_name.to_owned(), script.to_owned()));
        Ok(())
    }
}

/// Mock annotation exporter capturing names, optionally failing.
#[derive(Default)]
pub struct MockAnnotationExporter {
    exported: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockAnnotationExporter {
    /// Creates an exporter that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an exporter whose `export` always fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            exported: Arc::default(),
            fail: true,
        }
    }

    /// Names passed through `export`, in order.
    #[must_use]
    pub fn exported(&self) -> Vec<String> {
        self.exported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AnnotationExporter for MockAnnotationExporter {
    fn export(&self, _slide: &dyn SlideHandle, name: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("scripted annotation failure");
        }
        self.exported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(name.to_owned());
        Ok(())
    }
}
