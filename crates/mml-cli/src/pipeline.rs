//! Extraction pipeline: walk note directories, pair every note with its
//! engine output, and write the note, concept, and pivot tables.
//!
//! The run has two passes over the same files. The first pass discovers the
//! concept-table columns (the wide flag columns only exist once a record
//! carrying them is seen, and CSV headers cannot be amended after the fact).
//! The second pass parses again and streams rows out.

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{debug, info, warn};

use mml_ingest::{OutputLookup, find_output_file, list_note_files, read_note_record};
use mml_model::{ExtractFormat, TargetCuis};
use mml_parse::{
    DEFAULT_EXTRACT_ENCODING, DEFAULT_NOTE_ENCODING, ExtractOptions, decode_file,
    extract_mml_data,
};
use mml_report::{ConceptTableWriter, FieldSchema, NoteTableWriter, build_pivot_table};

/// Settings for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Directories containing the notes the engine processed.
    pub note_directories: Vec<PathBuf>,
    /// Directory the result tables are written to.
    pub outdir: PathBuf,
    /// Optional `FROM_CUI[,TO_CUI...]` mapping file.
    pub cui_file: Option<PathBuf>,
    /// Engine output format to look for.
    pub extract_format: ExtractFormat,
    /// Engine output directories when separate from the note directories,
    /// ordered to mirror them.
    pub extract_directories: Vec<PathBuf>,
    /// Extra columns forced into the concept table.
    pub add_fieldnames: Vec<String>,
    /// Files per directory to scan during column discovery.
    pub max_search: usize,
    /// Drop records the engine marked negated.
    pub exclude_negated: bool,
    /// Warn instead of failing when a note has no engine output.
    pub skip_missing: bool,
    /// Encoding of the engine output files.
    pub extract_encoding: String,
    /// Encoding of the note text files.
    pub file_encoding: String,
    /// Note filename suffix, including the period.
    pub note_suffix: String,
    /// Engine-output suffix override, including the period.
    pub extract_suffix: Option<String>,
}

impl ExtractConfig {
    pub fn new(note_directories: Vec<PathBuf>, outdir: PathBuf) -> Self {
        Self {
            note_directories,
            outdir,
            cui_file: None,
            extract_format: ExtractFormat::Json,
            extract_directories: Vec::new(),
            add_fieldnames: Vec::new(),
            max_search: 1000,
            exclude_negated: false,
            skip_missing: false,
            extract_encoding: DEFAULT_EXTRACT_ENCODING.to_string(),
            file_encoding: DEFAULT_NOTE_ENCODING.to_string(),
            note_suffix: ".txt".to_string(),
            extract_suffix: None,
        }
    }
}

/// Counts and output paths from a finished extraction run.
#[derive(Debug, Clone)]
pub struct ExtractReport {
    pub notes_found: usize,
    pub notes_processed: usize,
    pub records_written: usize,
    pub distinct_cuis: usize,
    pub note_outfile: PathBuf,
    pub mml_outfile: PathBuf,
    pub pivot_outfile: PathBuf,
}

/// Run the full extraction: discovery pass, table pass, pivot.
pub fn run_extract(config: &ExtractConfig) -> Result<ExtractReport> {
    let now = Local::now().format("%Y%m%d_%H%M%S");
    fs::create_dir_all(&config.outdir).with_context(|| {
        format!("creating output directory {}", config.outdir.display())
    })?;
    let note_outfile = config.outdir.join(format!("notes_{now}.csv"));
    let mml_outfile = config.outdir.join(format!("mml_{now}.csv"));
    let pivot_outfile = config.outdir.join(format!("cuis_by_doc_{now}.csv"));

    let target_cuis = load_target_cuis(config.cui_file.as_deref())?;
    let mut lookup = OutputLookup::new(config.extract_format, config.extract_suffix.as_deref());
    lookup.extract_directories = config.extract_directories.clone();
    lookup.skip_missing = config.skip_missing;
    let mut options = ExtractOptions::for_format(config.extract_format);
    options.extract_encoding = config.extract_encoding.clone();

    let mut schema = FieldSchema::new();
    for name in &config.add_fieldnames {
        schema.push(name);
    }
    discover_field_names(config, &lookup, &options, &mut schema)?;

    let mut note_writer = NoteTableWriter::create(&note_outfile)?;
    let mut concept_writer = ConceptTableWriter::create(&mml_outfile, &schema)?;
    let mut cuis: BTreeSet<String> = BTreeSet::new();
    let mut notes_found = 0usize;
    let mut notes_processed = 0usize;
    for (dir_index, note_dir) in config.note_directories.iter().enumerate() {
        info!(directory = %note_dir.display(), "processing directory");
        for note in list_note_files(note_dir, &config.note_suffix)? {
            debug!(file = %note.display(), "processing file");
            notes_found += 1;
            let mut record = read_note_record(&note, &config.file_encoding)?;
            match find_output_file(&lookup, note_dir, &record.filename, dir_index)? {
                Some(outfile) => {
                    debug!(file = %outfile.display(), "processing engine output");
                    for concept in extract_mml_data(&outfile, &target_cuis, &options)? {
                        if config.exclude_negated && concept.negated {
                            continue;
                        }
                        cuis.insert(concept.cui.clone());
                        concept_writer.write_record(&concept)?;
                    }
                    record.processed = true;
                    notes_processed += 1;
                }
                None => {
                    record.processed = false;
                }
            }
            note_writer.write_record(&record)?;
        }
    }
    let records_written = concept_writer.rows_written();
    concept_writer.finish()?;
    note_writer.finish()?;
    info!(
        notes = notes_found,
        processed = notes_processed,
        records = records_written,
        "extraction complete"
    );

    build_pivot_table(&mml_outfile, &pivot_outfile, &target_cuis)?;

    Ok(ExtractReport {
        notes_found,
        notes_processed,
        records_written,
        distinct_cuis: cuis.len(),
        note_outfile,
        mml_outfile,
        pivot_outfile,
    })
}

/// Scan up to `max_search` paired outputs per directory and accumulate
/// every column any record would populate.
///
/// Discovery parses with an empty CUI policy so filtered-out concepts
/// still contribute their columns.
fn discover_field_names(
    config: &ExtractConfig,
    lookup: &OutputLookup,
    options: &ExtractOptions,
    schema: &mut FieldSchema,
) -> Result<()> {
    info!("retrieving fieldnames");
    let unfiltered = TargetCuis::default();
    for (dir_index, note_dir) in config.note_directories.iter().enumerate() {
        let mut searched = 0usize;
        for note in list_note_files(note_dir, &config.note_suffix)? {
            let stem = note
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let Some(outfile) = find_output_file(lookup, note_dir, &stem, dir_index)? else {
                continue;
            };
            for record in extract_mml_data(&outfile, &unfiltered, options)? {
                schema.observe(&record);
            }
            searched += 1;
            if searched > config.max_search {
                break;
            }
        }
    }
    Ok(())
}

fn load_target_cuis(cui_file: Option<&Path>) -> Result<TargetCuis> {
    let Some(path) = cui_file else {
        warn!("retaining all CUIs");
        return Ok(TargetCuis::default());
    };
    let cuis = TargetCuis::from_file(path)
        .with_context(|| format!("loading target CUIs from {}", path.display()))?;
    info!(
        keys = cuis.n_keys(),
        values = cuis.n_values(),
        "loaded target CUI mapping"
    );
    Ok(cuis)
}

/// Settings for one split run.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Files, or directories of files, to split.
    pub files: Vec<PathBuf>,
    /// Number of lines after which to start a new file.
    pub n_lines: usize,
    /// Filelist to append produced file names to.
    pub filelist: Option<PathBuf>,
    /// Encoding of the input files (outputs are written the same way).
    pub encoding: String,
}

/// Split long note files into numbered parts without breaking lines.
///
/// Some engines choke on long inputs; splitting on line boundaries keeps
/// the parts parseable. Produced file names are appended to a filelist so
/// the engine can be pointed at the parts directly. Returns the produced
/// paths.
pub fn run_split(config: &SplitConfig) -> Result<Vec<PathBuf>> {
    let first = config
        .files
        .first()
        .context("no input files to split")?;
    let filelist = config
        .filelist
        .clone()
        .unwrap_or_else(|| default_filelist(first));
    let mut filelist_out = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filelist)
        .with_context(|| format!("opening filelist {}", filelist.display()))?;

    let mut produced = Vec::new();
    for file in &config.files {
        if file.is_dir() {
            let entries = fs::read_dir(file)
                .with_context(|| format!("reading directory {}", file.display()))?;
            let mut paths: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                .filter(|path| path.is_file())
                .collect();
            paths.sort();
            for path in paths {
                split_one(&path, config, &mut filelist_out, &mut produced)?;
            }
        } else {
            split_one(file, config, &mut filelist_out, &mut produced)?;
        }
    }
    info!(parts = produced.len(), filelist = %filelist.display(), "split complete");
    Ok(produced)
}

fn split_one(
    file: &Path,
    config: &SplitConfig,
    filelist_out: &mut fs::File,
    produced: &mut Vec<PathBuf>,
) -> Result<()> {
    for part in split_on_lines(file, config.n_lines, &config.encoding)? {
        writeln!(filelist_out, "{}", part.display())
            .with_context(|| format!("appending to filelist for {}", file.display()))?;
        produced.push(part);
    }
    Ok(())
}

/// Write `file` back out as `{stem}_{i}{suffix}` parts of at most `n_lines`
/// lines each. The final part holds the remainder and is always written,
/// even when empty.
fn split_on_lines(file: &Path, n_lines: usize, encoding_label: &str) -> Result<Vec<PathBuf>> {
    let text = decode_file(file, encoding_label)
        .with_context(|| format!("reading {}", file.display()))?;
    let encoding = encoding_rs::Encoding::for_label(encoding_label.as_bytes())
        .with_context(|| format!("unknown encoding label {encoding_label}"))?;
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    let mut parts = Vec::new();
    let mut index = 0usize;
    let mut start = 0usize;
    while start + n_lines <= lines.len() {
        parts.push(write_part(
            file,
            index,
            &lines[start..start + n_lines],
            encoding,
        )?);
        index += 1;
        start += n_lines;
    }
    parts.push(write_part(file, index, &lines[start..], encoding)?);
    Ok(parts)
}

fn write_part(
    file: &Path,
    index: usize,
    lines: &[&str],
    encoding: &'static encoding_rs::Encoding,
) -> Result<PathBuf> {
    let path = part_path(file, index);
    let content: String = lines.concat();
    let (bytes, _, _) = encoding.encode(&content);
    fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn part_path(file: &Path, index: usize) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match file.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{stem}_{index}.{ext}"),
        None => format!("{stem}_{index}"),
    };
    file.with_file_name(name)
}

fn default_filelist(first: &Path) -> PathBuf {
    let stem = first
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("filelist_split_{stem}.txt");
    match first.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}
