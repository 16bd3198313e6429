//! Reproducibility step recording.

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use slide_export_core::domain::BatchItem;
use slide_export_core::ports::StepRecorder;
use tracing::debug;

/// One persisted workflow step.
#[derive(Debug, Serialize, Deserialize)]
struct StepRecord {
    step: String,
    script: String,
    timestamp: String,
}

/// Appends named workflow steps to `{name}.steps.json` files.
pub struct JsonStepRecorder {
    output_dir: PathBuf,
}

impl JsonStepRecorder {
    /// Creates a recorder writing into `output_dir`.
    #[must_use]
    pub const fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    fn history_path(&self, item: &BatchItem) -> PathBuf {
        self.output_dir.join(format!("{}.steps.json", item.name))
    }
}

impl StepRecorder for JsonStepRecorder {
    fn record(&self, item: &BatchItem, step_name: &str, script: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;

        let path = self.history_path(item);
        let mut history: Vec<StepRecord> = if path.is_file() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Corrupt step history: {}", path.display()))?
        } else {
            Vec::new()
        };

        history.push(StepRecord {
            step: step_name.to_owned(),
            script: script.to_owned(),
            timestamp: iso_timestamp(),
        });

        std::fs::write(&path, serde_json::to_string_pretty(&history)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Recorded step '{step_name}' for {}", item.name);
        Ok(())
    }
}

/// ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
