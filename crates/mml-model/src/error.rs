use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unrecognized output format: {0}")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
