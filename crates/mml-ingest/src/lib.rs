//! Note-file discovery and pairing with NLP engine output.
//!
//! The extraction pipeline walks directories of clinical notes and, for each
//! note, locates the engine output file produced for it. Output files live
//! either next to the note or in separate per-directory output trees, and
//! the engine may rename files (`note.txt` -> `note.txt.xmi`), so pairing is
//! convention-driven rather than exact.

pub mod discovery;
pub mod error;
pub mod notes;

pub use discovery::{OutputLookup, find_output_file, list_note_files};
pub use error::{IngestError, Result};
pub use notes::{NoteRecord, read_note_record};
