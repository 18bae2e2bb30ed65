use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};
use crate::state::SimulationResult;

pub const DEFAULT_RESULTS_FILE: &str = "load_test_results.json";

pub fn to_json(result: &SimulationResult) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    result
        .serialize(&mut ser)
        .map_err(|err| Error::Persist(format!("failed to encode result: {}", err)))?;
    String::from_utf8(buf).map_err(|err| Error::Persist(format!("failed to encode result: {}", err)))
}

pub fn from_json(contents: &str) -> Result<SimulationResult> {
    serde_json::from_str(contents)
        .map_err(|err| Error::Persist(format!("failed to parse result: {}", err)))
}

pub fn save_result(path: &Path, result: &SimulationResult) -> Result<()> {
    let json = to_json(result)?;
    fs::write(path, json).map_err(|err| {
        Error::Persist(format!(
            "failed to write result '{}': {}",
            path.display(),
            err
        ))
    })?;
    info!(path = %path.display(), "saved result");
    Ok(())
}

/// Loads a saved result. A missing file means no run has been saved yet.
pub fn load_result(path: &Path) -> Result<SimulationResult> {
    let contents = fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => Error::NoResult(format!("'{}' does not exist", path.display())),
        _ => Error::Persist(format!(
            "failed to read result '{}': {}",
            path.display(),
            err
        )),
    })?;
    from_json(&contents)
}
