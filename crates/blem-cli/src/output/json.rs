//! JSON output adapter.

use std::io::{self, Write};
use std::sync::Mutex;

use anyhow::Result;
use blem_core::{ClassificationResult, ResultOutput};
use clap::ValueEnum;

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

struct State {
    writer: Box<dyn Write + Send>,
    /// Results held back until flush in array mode.
    pending: Vec<ClassificationResult>,
    array_written: bool,
}

/// JSON output adapter.
///
/// In JSON Lines mode each result is written as it arrives. In array mode
/// results are collected and written as one array on the first flush.
pub struct JsonOutput {
    state: Mutex<State>,
    format: OutputFormat,
    pretty: bool,
}

impl JsonOutput {
    /// Creates a new JSON output writing to stdout.
    #[must_use]
    pub fn stdout(format: OutputFormat, pretty: bool) -> Self {
        Self::new(Box::new(io::stdout()), format, pretty)
    }

    /// Creates a new JSON output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>, format: OutputFormat, pretty: bool) -> Self {
        Self {
            state: Mutex::new(State {
                writer,
                pending: Vec::new(),
                array_written: false,
            }),
            format,
            pretty,
        }
    }
}

impl ResultOutput for JsonOutput {
    #[allow(clippy::significant_drop_tightening)]
    fn write(&self, result: &ClassificationResult) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        match self.format {
            OutputFormat::Jsonl => {
                let json = serde_json::to_string(result)?;
                writeln!(state.writer, "{json}")?;
            }
            OutputFormat::Json => state.pending.push(result.clone()),
        }
        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        if self.format == OutputFormat::Json && !state.array_written {
            let json = if self.pretty {
                serde_json::to_string_pretty(&state.pending)?
            } else {
                serde_json::to_string(&state.pending)?
            };
            writeln!(state.writer, "{json}")?;
            state.pending.clear();
            state.array_written = true;
        }
        state.writer.flush()?;
        Ok(())
    }
}
