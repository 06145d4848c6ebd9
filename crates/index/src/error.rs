use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or querying the restaurant vector index.
///
/// Everything except [`IndexError::DimensionMismatch`] at query time is a
/// startup-time configuration problem.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("index file missing: {0}")]
    MissingFile(PathBuf),
    #[error("index file {path} is only {size} bytes (minimum {min})")]
    TooSmall { path: PathBuf, size: u64, min: u64 },
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed index data: {0}")]
    Format(String),
    #[error("unsupported FAISS index type '{0}' (expected flat inner-product 'IxFI')")]
    UnsupportedIndexType(String),
    #[error("id array {0} is empty")]
    EmptyIds(PathBuf),
    #[error("index has {vectors} vectors but id array has {ids} entries")]
    CountMismatch { vectors: usize, ids: usize },
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("invalid index config: {0}")]
    InvalidConfig(String),
}

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
