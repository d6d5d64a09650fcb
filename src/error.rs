use std::io;
use std::path::PathBuf;

/// Errors raised outside of parsing proper.
///
/// Classifying and tree-building never fail; only reading project files and
/// (de)serializing JSON do.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to walk project directory: {0}")]
    Walk(#[from] ignore::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
