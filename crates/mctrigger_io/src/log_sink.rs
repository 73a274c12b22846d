//! JSON-lines log of trigger status messages.
//!
//! One object per message, appended as it arrives, so a run's convergence
//! history can be followed with `tail -f` or replayed into a notebook.

use crate::error::{IoError, Result};
use mctrigger_core::{MessageLevel, MessageSink};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: MessageLevel,
    pub message: String,
    /// RFC 3339 wall-clock time the message was written.
    pub timestamp: String,
}

/// [`MessageSink`] writing [`LogRecord`]s to any writer.
///
/// Write failures cannot travel back through the sink interface; they are
/// logged and counted instead.
pub struct JsonlSink<W: Write> {
    writer: W,
    failures: usize,
}

impl JsonlSink<BufWriter<File>> {
    /// Opens `path` for appending, creating it if needed.
    pub fn append<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                IoError::from(e).with_context(format!("opening log {}", path.display()))
            })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failures: 0,
        }
    }

    /// Messages that could not be written.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and returns the number of messages that were lost, warning
    /// when there are any.
    pub fn finish(&mut self) -> Result<usize> {
        self.flush()?;
        if self.failures > 0 {
            tracing::warn!(failures = self.failures, "Trigger log is missing records");
        }
        Ok(self.failures)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, level: MessageLevel, message: &str) -> Result<()> {
        let record = LogRecord {
            level,
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let line = serde_json::to_string(&record)?;
        writeln!(self.writer, "{line}")?;
        Ok(())
    }

    fn push(&mut self, level: MessageLevel, message: &str) {
        if let Err(e) = self.write_record(level, message) {
            self.failures += 1;
            tracing::warn!(error = %e, "Failed to write trigger log record");
        }
    }
}

impl<W: Write> MessageSink for JsonlSink<W> {
    fn info(&mut self, message: &str) {
        self.push(MessageLevel::Info, message);
    }

    fn warning(&mut self, message: &str) {
        self.push(MessageLevel::Warning, message);
    }
}

/// Reads every record of a log written by [`JsonlSink`], skipping lines
/// that do not parse.
pub fn read_log<P: AsRef<Path>>(path: P) -> Result<Vec<LogRecord>> {
    let file = File::open(path.as_ref())?;
    Ok(BufReader::new(file)
        .lines()
        .map_while(std::result::Result::ok)
        .filter_map(|line| serde_json::from_str(&line).ok())
        .collect())
}
