//! JSON output adapter.

use anyhow::Result;
use slide_export_core::domain::{ChannelRange, ExportTally};
use std::io::{self, Write};
use std::sync::Mutex;

/// JSON writer for batch summaries and computed ranges.
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonOutput {
    /// Creates a new JSON output writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Creates a new JSON output writing to the given writer.
    #[allow(dead_code)] // API for programmatic use
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Writes the batch tally as one JSON document.
    pub fn write_summary(&self, tally: &ExportTally, pretty: bool) -> Result<()> {
        self.write_value(tally, pretty)
    }

    /// Writes computed channel ranges as one JSON document.
    pub fn write_ranges(&self, ranges: &[ChannelRange], pretty: bool) -> Result<()> {
        self.write_value(&ranges, pretty)
    }

    #[allow(clippy::significant_drop_tightening)]
    fn write_value<T: serde::Serialize>(&self, value: &T, pretty: bool) -> Result<()> {
        let json = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{json}")?;
        writer.flush()?;
        Ok(())
    }
}
