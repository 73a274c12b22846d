//! # mctrigger IO
//!
//! File boundary of the trigger engine:
//! - Structured error handling with [`IoError`]
//! - JSON problem snapshots and TOML settings
//! - A JSON-lines message sink for trigger verdicts

/// Error types and result aliases for I/O operations
pub mod error;
/// JSON-lines verdict log
pub mod log_sink;
/// Problem snapshot and settings files
pub mod snapshot;

pub use error::{IoError, Result};
pub use log_sink::{read_log, JsonlSink, LogRecord};
pub use snapshot::{read_problem, read_settings, write_problem};
