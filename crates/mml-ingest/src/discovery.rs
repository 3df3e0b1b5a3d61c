//! Note listing and engine-output pairing.

use std::path::{Path, PathBuf};

use mml_model::ExtractFormat;
use tracing::warn;

use crate::error::{IngestError, Result};

/// List the note files in a directory.
///
/// A file qualifies when its final suffix equals the note suffix, it has no
/// suffix at all, or its full compound suffix equals the note suffix
/// (`note.a.txt` with suffix `.a.txt`). Directories are skipped. Results are
/// sorted by filename so runs are deterministic.
pub fn list_note_files(dir: &Path, note_suffix: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("");
        if matches_note_suffix(name, note_suffix) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn matches_note_suffix(name: &str, note_suffix: &str) -> bool {
    let last_suffix = name.rfind('.').map(|idx| &name[idx..]).unwrap_or("");
    let full_suffix = name.find('.').map(|idx| &name[idx..]).unwrap_or("");
    last_suffix.is_empty() || last_suffix == note_suffix || full_suffix == note_suffix
}

/// How to locate the engine output file belonging to a note.
#[derive(Debug, Clone)]
pub struct OutputLookup {
    /// Output extension without the leading period.
    pub extension: String,
    /// Separate output directories, ordered to mirror the note directories.
    pub extract_directories: Vec<PathBuf>,
    /// Warn instead of failing when no output file exists for a note.
    pub skip_missing: bool,
}

impl OutputLookup {
    /// Build a lookup for a format, honoring an explicit suffix override.
    pub fn new(format: ExtractFormat, extract_suffix: Option<&str>) -> Self {
        let extension = extract_suffix
            .map(|suffix| suffix.trim_start_matches('.').to_string())
            .unwrap_or_else(|| format.default_extension().to_string());
        Self {
            extension,
            extract_directories: Vec::new(),
            skip_missing: false,
        }
    }
}

/// Locate the output file produced for a note.
///
/// Tries `{stem}.{extension}` first, then falls back to the stem truncated
/// at its first period (engines drop compound note suffixes when naming
/// output). `dir_index` is the position of `note_dir` in the configured
/// note-directory list; the matching extract directory is preferred before
/// the others are searched.
///
/// # Errors
///
/// A missing output file is fatal unless `skip_missing` is set, in which
/// case it is logged and `None` returned.
pub fn find_output_file(
    lookup: &OutputLookup,
    note_dir: &Path,
    stem: &str,
    dir_index: usize,
) -> Result<Option<PathBuf>> {
    if let Some(path) = find_path(lookup, note_dir, stem, dir_index) {
        return Ok(Some(path));
    }

    let short_stem = stem.split('.').next().unwrap_or(stem);
    if short_stem != stem {
        warn!(
            "failed to find expected output file: {stem}.{ext}; trying: {short_stem}.{ext}",
            ext = lookup.extension
        );
        if let Some(path) = find_path(lookup, note_dir, short_stem, dir_index) {
            return Ok(Some(path));
        }
    }

    if lookup.skip_missing {
        warn!(
            "failed to find expected output file: {stem}.{ext}",
            ext = lookup.extension
        );
        Ok(None)
    } else {
        Err(IngestError::MissingOutput {
            stem: stem.to_string(),
            extension: lookup.extension.clone(),
        })
    }
}

fn find_path(
    lookup: &OutputLookup,
    note_dir: &Path,
    stem: &str,
    dir_index: usize,
) -> Option<PathBuf> {
    let filename = format!("{stem}.{}", lookup.extension);
    if lookup.extract_directories.is_empty() {
        let candidate = note_dir.join(&filename);
        return candidate.exists().then_some(candidate);
    }
    // prefer the extract directory paired with this note directory
    if let Some(preferred) = lookup.extract_directories.get(dir_index) {
        let candidate = preferred.join(&filename);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    for (i, directory) in lookup.extract_directories.iter().enumerate() {
        if i == dir_index {
            continue;
        }
        let candidate = directory.join(&filename);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}
