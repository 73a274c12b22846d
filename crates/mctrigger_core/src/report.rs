//! Message sinks for trigger status reports.
//!
//! The engine never formats output itself beyond plain status strings; where
//! they go is up to the [`MessageSink`] it is handed.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    Info,
    Warning,
}

/// Receiver of plain-text status messages.
pub trait MessageSink {
    fn info(&mut self, message: &str);
    fn warning(&mut self, message: &str);

    fn emit(&mut self, level: MessageLevel, message: &str) {
        match level {
            MessageLevel::Info => self.info(message),
            MessageLevel::Warning => self.warning(message),
        }
    }
}

/// Forwards messages to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl MessageSink for TracingSink {
    fn info(&mut self, message: &str) {
        tracing::info!("{message}");
    }

    fn warning(&mut self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Keeps every message in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySink {
    pub messages: Vec<(MessageLevel, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|(level, _)| *level == MessageLevel::Warning)
            .map(|(_, m)| m.as_str())
    }

    pub fn infos(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|(level, _)| *level == MessageLevel::Info)
            .map(|(_, m)| m.as_str())
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl MessageSink for MemorySink {
    fn info(&mut self, message: &str) {
        self.messages.push((MessageLevel::Info, message.to_string()));
    }

    fn warning(&mut self, message: &str) {
        self.messages
            .push((MessageLevel::Warning, message.to_string()));
    }
}

impl<S: MessageSink + ?Sized> MessageSink for &mut S {
    fn info(&mut self, message: &str) {
        (**self).info(message);
    }

    fn warning(&mut self, message: &str) {
        (**self).warning(message);
    }
}
