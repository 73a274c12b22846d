//! Problem snapshots (JSON) and trigger settings (TOML).

use crate::error::{IoError, Result};
use mctrigger_core::TriggerSettings;
use mctrigger_data::Problem;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Reads and validates a problem snapshot.
pub fn read_problem<P: AsRef<Path>>(path: P) -> Result<Problem> {
    let path = path.as_ref();
    let context = || format!("reading snapshot {}", path.display());
    if !path.exists() {
        return Err(IoError::not_found(path.display().to_string()).with_context(context()));
    }
    let file = File::open(path).map_err(|e| IoError::from(e).with_context(context()))?;
    let problem: Problem = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| IoError::from(e).with_context(context()))?;
    problem
        .validate()
        .map_err(|e| IoError::validation(e.to_string()).with_context(context()))?;
    tracing::debug!(
        path = %path.display(),
        tallies = problem.tallies.len(),
        meshes = problem.meshes.len(),
        "Loaded problem snapshot"
    );
    Ok(problem)
}

/// Writes a problem snapshot as pretty-printed JSON.
pub fn write_problem<P: AsRef<Path>>(path: P, problem: &Problem) -> Result<()> {
    let path = path.as_ref();
    let context = || format!("writing snapshot {}", path.display());
    let file = File::create(path).map_err(|e| IoError::from(e).with_context(context()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, problem)
        .map_err(|e| IoError::from(e).with_context(context()))?;
    writer
        .flush()
        .map_err(|e| IoError::from(e).with_context(context()))?;
    Ok(())
}

/// Reads and validates trigger settings.
pub fn read_settings<P: AsRef<Path>>(path: P) -> Result<TriggerSettings> {
    let path = path.as_ref();
    let context = || format!("reading settings {}", path.display());
    let content =
        std::fs::read_to_string(path).map_err(|e| IoError::from(e).with_context(context()))?;
    let settings: TriggerSettings =
        toml::from_str(&content).map_err(|e| IoError::from(e).with_context(context()))?;
    settings
        .validate()
        .map_err(|e| IoError::validation(e.to_string()).with_context(context()))?;
    Ok(settings)
}
