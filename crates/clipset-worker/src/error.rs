//! Error types for pipeline execution.

use std::path::PathBuf;
use thiserror::Error;

use clipset_media::{FetchError, MediaError};
use clipset_models::{GeometryError, ManifestError, NamingError};

/// Result type for pipeline execution.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Run-level and per-clip pipeline errors.
///
/// `MalformedRecord` aborts a run before any processing starts - a broken
/// manifest likely affects many clips. Everything else is caught per clip,
/// logged with the clip identity, and never takes down the pool.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("malformed record at {}:{}: {}", .path.display(), .line, .source)]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: ManifestError,
    },

    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    #[error("cropped-video dependency not found: {0}")]
    MissingDependency(PathBuf),

    #[error("probe failed: {0}")]
    Probe(#[source] MediaError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error("external tool failed: {0}")]
    Tool(#[source] MediaError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
