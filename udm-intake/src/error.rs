//! Error types.

use std::path::PathBuf;

pub type IntakeResult<T> = Result<T, IntakeError>;

/// Everything that can terminate a run. All variants are terminal: the
/// pipeline never retries a failed step.
#[derive(thiserror::Error, Debug)]
pub enum IntakeError {
    #[error("missing required input: {0}")]
    MissingRequiredInput(String),
    #[error("run identifier {name:?} does not match the naming convention: {reason}")]
    MalformedRunIdentifier { name: String, reason: String },
    #[error("no archive found in {0:?}")]
    ArchiveNotFound(PathBuf),
    #[error("expected exactly one archive in {dir:?}, found {count}")]
    AmbiguousArchive { dir: PathBuf, count: usize },
    #[error("failed to extract {path:?}: {reason}")]
    ExtractionFailure { path: PathBuf, reason: String },
    #[error("designated output file not found at {0:?} after extraction")]
    MissingDesignatedOutput(PathBuf),
    #[error("parameter table not found: {0:?}")]
    MissingParameterTable(PathBuf),
    #[error("failed to parse parameter table {path:?}: {source}")]
    MalformedParameterTable {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },
    #[error("raster {path:?} has no usable spatial reference: {reason}")]
    MissingSpatialReference { path: PathBuf, reason: String },
    #[error("failed to open raster {path:?}: {reason}")]
    RasterOpenError { path: PathBuf, reason: String },
    #[error("unsupported source CRS: {0}")]
    UnsupportedCrs(String),
    #[error("failed to write {path:?}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
