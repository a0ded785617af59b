use std::path::PathBuf;

use thiserror::Error;

/// Outcomes of store operations that callers need to tell apart.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    AlreadyExists(String),
    /// The backing file exists but does not hold a valid JSON map.
    #[error("backing file {path} is not a valid record map: {source}")]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Rewriting the backing file failed. The in-memory change has already been applied.
    #[error("cannot persist to {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot serialize records: {0}")]
    Serialize(#[source] serde_json::Error),
}
