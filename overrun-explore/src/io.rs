//! Reading and writing traces and experiment records.
//!
//! JSON is the interchange format (the log-analysis tooling emits and
//! consumes it); postcard is the compact binary alternative for large
//! sweep outputs.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::experiments::ExperimentSet;
use overrun_model::Trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Postcard,
}

#[derive(Debug, thiserror::Error)]
pub enum DataIoError {
    #[error("failed reading data file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed decoding json: {0}")]
    JsonDecode(#[from] serde_json::Error),

    #[error("failed encoding postcard: {0}")]
    PostcardEncode(#[source] postcard::Error),

    #[error("failed decoding postcard: {0}")]
    PostcardDecode(#[source] postcard::Error),

    #[error("failed writing data file: {0}")]
    Write(#[source] std::io::Error),
}

fn encode<T: Serialize>(value: &T, format: DataFormat) -> Result<Vec<u8>, DataIoError> {
    match format {
        DataFormat::Json => Ok(serde_json::to_vec_pretty(value)?),
        DataFormat::Postcard => postcard::to_stdvec(value).map_err(DataIoError::PostcardEncode),
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8], format: DataFormat) -> Result<T, DataIoError> {
    match format {
        DataFormat::Json => Ok(serde_json::from_slice(bytes)?),
        DataFormat::Postcard => postcard::from_bytes(bytes).map_err(DataIoError::PostcardDecode),
    }
}

pub fn write_trace_to_path(
    path: impl AsRef<Path>,
    trace: &Trace,
    format: DataFormat,
) -> Result<(), DataIoError> {
    let bytes = encode(trace, format)?;
    fs::write(path, bytes).map_err(DataIoError::Write)
}

pub fn read_trace_from_path(
    path: impl AsRef<Path>,
    format: DataFormat,
) -> Result<Trace, DataIoError> {
    let bytes = fs::read(path)?;
    decode(&bytes, format)
}

pub fn write_experiments_to_path(
    path: impl AsRef<Path>,
    experiments: &ExperimentSet,
    format: DataFormat,
) -> Result<(), DataIoError> {
    let bytes = encode(experiments, format)?;
    fs::write(path, bytes).map_err(DataIoError::Write)
}

/// Strict read: a missing file is an error. Use [`load_experiments`]
/// when the data source is optional.
pub fn read_experiments_from_path(
    path: impl AsRef<Path>,
    format: DataFormat,
) -> Result<ExperimentSet, DataIoError> {
    let bytes = fs::read(path)?;
    decode(&bytes, format)
}

/// Lenient load for an optional comparison source.
///
/// A missing file is a warning-level outcome (`Ok(None)`): the
/// analytical computation proceeds and the comparison is skipped.
/// Structurally invalid content is still a fatal error — silently
/// proceeding would produce misleading comparisons.
pub fn load_experiments(path: impl AsRef<Path>) -> Result<Option<ExperimentSet>, DataIoError> {
    let path = path.as_ref();
    if !path.exists() {
        warn!(path = %path.display(), "experiment data not found; skipping comparison");
        return Ok(None);
    }
    read_experiments_from_path(path, format_from_extension(path)).map(Some)
}

/// Heuristic helper: choose format from file extension.
pub fn format_from_extension(path: impl AsRef<Path>) -> DataFormat {
    match path.as_ref().extension().and_then(|s| s.to_str()) {
        Some("bin") | Some("postcard") => DataFormat::Postcard,
        _ => DataFormat::Json,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(format_from_extension("runs/trace.json"), DataFormat::Json);
        assert_eq!(format_from_extension("runs/trace.bin"), DataFormat::Postcard);
        assert_eq!(
            format_from_extension("runs/trace.postcard"),
            DataFormat::Postcard
        );
        assert_eq!(format_from_extension("runs/trace"), DataFormat::Json);
    }
}
