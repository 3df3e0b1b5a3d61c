//! Per-note statistics for the processing-status table.

use std::path::Path;

use encoding_rs::Encoding;
use serde::Serialize;

use crate::error::{IngestError, Result};

/// Columns of the note table, in output order.
pub const NOTE_FIELDNAMES: [&str; 6] = [
    "filename",
    "docid",
    "num_chars",
    "num_letters",
    "num_words",
    "processed",
];

/// One row of the note table: basic size statistics plus whether an engine
/// output file was found and parsed for it.
#[derive(Debug, Clone, Serialize)]
pub struct NoteRecord {
    /// Note file stem.
    pub filename: String,
    /// Full note path.
    pub docid: String,
    pub num_chars: usize,
    pub num_letters: usize,
    pub num_words: usize,
    pub processed: bool,
}

/// Read a note and compute its statistics.
///
/// `processed` starts false; the pipeline flips it once the paired engine
/// output has been parsed.
pub fn read_note_record(path: &Path, encoding_label: &str) -> Result<NoteRecord> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let encoding = Encoding::for_label(encoding_label.as_bytes())
        .ok_or_else(|| IngestError::UnknownEncoding(encoding_label.to_string()))?;
    let (text, had_errors) = encoding.decode_with_bom_removal(&bytes);
    if had_errors {
        return Err(IngestError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        });
    }

    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(NoteRecord {
        filename: stem,
        docid: path.display().to_string(),
        num_chars: text.chars().count(),
        num_letters: text.chars().filter(char::is_ascii_alphanumeric).count(),
        num_words: text.split_whitespace().count(),
        processed: false,
    })
}
