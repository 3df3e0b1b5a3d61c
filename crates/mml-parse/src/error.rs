use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),

    #[error("malformed {encoding} byte sequence in {path}")]
    Decode { path: PathBuf, encoding: String },

    #[error("invalid json output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid xmi output: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid xmi attribute: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("element {element} is missing required attribute {attribute}")]
    MissingAttribute { element: String, attribute: String },

    #[error("invalid {context} value: {value:?}")]
    InvalidValue {
        context: &'static str,
        value: String,
    },

    #[error("no part-of-speech entry at offset {offset}: token layer incomplete")]
    PosLookup { offset: usize },

    #[error("bracketed multi-span positional info is not supported: {value:?}")]
    UnsupportedSpan { value: String },
}

impl ParseError {
    pub(crate) fn invalid(context: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            context,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
