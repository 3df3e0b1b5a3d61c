//! Format dispatch: decode a raw output file and hand it to the right
//! parser.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use encoding_rs::Encoding;
use mml_model::{ConceptRecord, ExtractFormat, FieldValue, TargetCuis};
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::{json, mmi, xmi};

/// Default encoding for NLP engine output (MetaMapLite and cTAKES both
/// write the Western code page on the deployments this serves).
pub const DEFAULT_EXTRACT_ENCODING: &str = "windows-1252";

/// Default encoding for the original note text.
pub const DEFAULT_NOTE_ENCODING: &str = "utf-8";

/// Per-run extraction settings shared by every file.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Format of the engine output files.
    pub extract_format: ExtractFormat,
    /// Encoding label for engine output files.
    pub extract_encoding: String,
    /// Collapse repeated codings of one concept within an XMI mention.
    pub skip_repeat_concepts: bool,
    /// Base columns copied into every emitted record.
    pub extras: BTreeMap<String, FieldValue>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            extract_format: ExtractFormat::Json,
            extract_encoding: DEFAULT_EXTRACT_ENCODING.to_string(),
            skip_repeat_concepts: true,
            extras: BTreeMap::new(),
        }
    }
}

impl ExtractOptions {
    pub fn for_format(extract_format: ExtractFormat) -> Self {
        Self {
            extract_format,
            ..Self::default()
        }
    }
}

/// Read a file and decode it under the given encoding label.
///
/// Decode failures are fatal: no transcoding or replacement is attempted.
pub fn decode_file(path: &Path, encoding_label: &str) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let encoding = Encoding::for_label(encoding_label.as_bytes())
        .ok_or_else(|| ParseError::UnknownEncoding(encoding_label.to_string()))?;
    let (text, had_errors) = encoding.decode_with_bom_removal(&bytes);
    if had_errors {
        return Err(ParseError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        });
    }
    Ok(text.into_owned())
}

/// Extract normalized concept records from one engine output file.
///
/// Empty or whitespace-only files yield no records (an unprocessed or
/// concept-free note is not an error). Everything else is parsed according
/// to `options.extract_format`; a malformed file fails as a whole.
pub fn extract_mml_data(
    file: &Path,
    target_cuis: &TargetCuis,
    options: &ExtractOptions,
) -> Result<Vec<ConceptRecord>> {
    let text = decode_file(file, &options.extract_encoding)?;
    if text.trim().is_empty() {
        debug!(file = %file.display(), "empty engine output");
        return Ok(Vec::new());
    }
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match options.extract_format {
        ExtractFormat::Json => {
            let data = serde_json::from_str(&text)?;
            json::extract_mml_from_json_data(data, &filename, target_cuis)
        }
        ExtractFormat::Mmi => mmi::extract_mml_from_mmi_data(&text, &filename, target_cuis),
        ExtractFormat::Xmi => {
            xmi::extract_mml_from_xmi_data(&text, &filename, target_cuis, options)
        }
    }
}
