use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),

    #[error("malformed {encoding} byte sequence in {path}")]
    Decode { path: PathBuf, encoding: String },

    #[error("failed to find expected output file: {stem}.{extension}")]
    MissingOutput { stem: String, extension: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
