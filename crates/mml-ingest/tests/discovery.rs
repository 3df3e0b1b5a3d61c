//! Discovery and output-pairing behavior.

use std::fs;

use mml_ingest::{IngestError, OutputLookup, find_output_file, list_note_files};
use mml_model::ExtractFormat;

#[test]
fn lists_notes_by_suffix_sorted() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.txt"), "x").unwrap();
    fs::write(dir.path().join("a.txt"), "x").unwrap();
    fs::write(dir.path().join("noext"), "x").unwrap();
    fs::write(dir.path().join("c.json"), "x").unwrap();
    fs::create_dir(dir.path().join("sub.txt")).unwrap();

    let files = list_note_files(dir.path(), ".txt").unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "noext"]);
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = list_note_files(&dir.path().join("nope"), ".txt").unwrap_err();
    assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
}

#[test]
fn pairs_output_next_to_note() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("note1.json"), "{}").unwrap();
    let lookup = OutputLookup::new(ExtractFormat::Json, None);
    let found = find_output_file(&lookup, dir.path(), "note1", 0).unwrap();
    assert_eq!(found, Some(dir.path().join("note1.json")));
}

#[test]
fn xmi_outputs_use_engine_renaming() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("note1.txt.xmi"), "<xmi/>").unwrap();
    let lookup = OutputLookup::new(ExtractFormat::Xmi, None);
    let found = find_output_file(&lookup, dir.path(), "note1", 0).unwrap();
    assert_eq!(found, Some(dir.path().join("note1.txt.xmi")));
}

#[test]
fn explicit_suffix_overrides_format_extension() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("note1.out"), "").unwrap();
    let lookup = OutputLookup::new(ExtractFormat::Json, Some(".out"));
    let found = find_output_file(&lookup, dir.path(), "note1", 0).unwrap();
    assert_eq!(found, Some(dir.path().join("note1.out")));
}

#[test]
fn falls_back_to_first_dot_stem() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("note1.mmi"), "").unwrap();
    let lookup = OutputLookup::new(ExtractFormat::Mmi, None);
    let found = find_output_file(&lookup, dir.path(), "note1.tx", 0).unwrap();
    assert_eq!(found, Some(dir.path().join("note1.mmi")));
}

#[test]
fn prefers_the_paired_extract_directory() {
    let notes = tempfile::tempdir().unwrap();
    let out_a = tempfile::tempdir().unwrap();
    let out_b = tempfile::tempdir().unwrap();
    fs::write(out_a.path().join("note1.json"), "{}").unwrap();
    fs::write(out_b.path().join("note1.json"), "{}").unwrap();

    let mut lookup = OutputLookup::new(ExtractFormat::Json, None);
    lookup.extract_directories =
        vec![out_a.path().to_path_buf(), out_b.path().to_path_buf()];
    let found = find_output_file(&lookup, notes.path(), "note1", 1).unwrap();
    assert_eq!(found, Some(out_b.path().join("note1.json")));
}

#[test]
fn searches_other_extract_directories() {
    let notes = tempfile::tempdir().unwrap();
    let out_a = tempfile::tempdir().unwrap();
    let out_b = tempfile::tempdir().unwrap();
    fs::write(out_a.path().join("note1.json"), "{}").unwrap();

    let mut lookup = OutputLookup::new(ExtractFormat::Json, None);
    lookup.extract_directories =
        vec![out_a.path().to_path_buf(), out_b.path().to_path_buf()];
    let found = find_output_file(&lookup, notes.path(), "note1", 1).unwrap();
    assert_eq!(found, Some(out_a.path().join("note1.json")));
}

#[test]
fn missing_output_is_fatal_unless_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let lookup = OutputLookup::new(ExtractFormat::Json, None);
    let err = find_output_file(&lookup, dir.path(), "note1", 0).unwrap_err();
    assert!(matches!(err, IngestError::MissingOutput { .. }));

    let mut lookup = OutputLookup::new(ExtractFormat::Json, None);
    lookup.skip_missing = true;
    let found = find_output_file(&lookup, dir.path(), "note1", 0).unwrap();
    assert_eq!(found, None);
}
