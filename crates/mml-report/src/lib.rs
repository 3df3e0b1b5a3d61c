//! Tabular output for the extraction pipeline.
//!
//! Two tables per run plus a pivot: the concept table (one row per extracted
//! concept record, columns discovered from the records themselves), the note
//! table (one row per note with size statistics and processing status), and
//! the concept-by-document pivot counting each CUI per note.

pub mod pivot;
pub mod schema;
pub mod tables;

pub use pivot::build_pivot_table;
pub use schema::FieldSchema;
pub use tables::{ConceptTableWriter, NoteTableWriter};
