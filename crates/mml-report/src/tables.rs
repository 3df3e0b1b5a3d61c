//! CSV writers for the concept and note tables.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use mml_ingest::NoteRecord;
use mml_model::ConceptRecord;
use tracing::warn;

use crate::schema::FieldSchema;

/// Per-run cap on individual missing-column warnings.
const MISSING_COLUMN_WARN_BUDGET: usize = 5;

/// Streams [`ConceptRecord`]s into a wide CSV using a fixed column schema.
///
/// The schema must be fully accumulated before the writer is created; the
/// header is written once and a record that lacks a schema column gets an
/// empty cell for it. A record carrying a column the schema never saw is a
/// discovery-pass bug, so those are warned about (capped per run).
pub struct ConceptTableWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    columns: Vec<String>,
    rows_written: usize,
    missing_total: usize,
    missing_warned: usize,
}

impl ConceptTableWriter {
    /// Create the output file and write the header row.
    pub fn create(path: &Path, schema: &FieldSchema) -> anyhow::Result<Self> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating concept table {}", path.display()))?;
        writer
            .write_record(schema.names())
            .with_context(|| format!("writing concept table header to {}", path.display()))?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            columns: schema.names().to_vec(),
            rows_written: 0,
            missing_total: 0,
            missing_warned: 0,
        })
    }

    /// Write one record as a row, in schema column order.
    pub fn write_record(&mut self, record: &ConceptRecord) -> anyhow::Result<()> {
        for name in record.field_names() {
            if !self.columns.iter().any(|column| column == name) {
                self.missing_total += 1;
                if self.missing_warned < MISSING_COLUMN_WARN_BUDGET {
                    self.missing_warned += 1;
                    warn!(
                        column = name,
                        event_id = %record.event_id,
                        "record column missing from schema; value dropped"
                    );
                }
            }
        }
        let row: Vec<String> = self
            .columns
            .iter()
            .map(|name| {
                record
                    .field(name)
                    .map(|value| value.to_string())
                    .unwrap_or_default()
            })
            .collect();
        self.writer
            .write_record(&row)
            .with_context(|| format!("writing concept row to {}", self.path.display()))?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and close the table.
    pub fn finish(mut self) -> anyhow::Result<()> {
        if self.missing_total > self.missing_warned {
            warn!(
                dropped = self.missing_total,
                "values dropped for columns missing from the concept schema"
            );
        }
        self.writer
            .flush()
            .with_context(|| format!("flushing concept table {}", self.path.display()))
    }
}

/// Streams per-note statistics rows.
pub struct NoteTableWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows_written: usize,
}

impl NoteTableWriter {
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating note table {}", path.display()))?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            rows_written: 0,
        })
    }

    pub fn write_record(&mut self, record: &NoteRecord) -> anyhow::Result<()> {
        self.writer
            .serialize(record)
            .with_context(|| format!("writing note row to {}", self.path.display()))?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn finish(mut self) -> anyhow::Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("flushing note table {}", self.path.display()))
    }
}
