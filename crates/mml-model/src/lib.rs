//! Shared types for the MML extraction pipeline: normalized concept
//! records, the target-CUI policy, format tags and the UMLS semantic-type
//! table.

pub mod error;
pub mod formats;
pub mod record;
pub mod semantic_types;
pub mod target_cuis;

pub use error::{ModelError, Result};
pub use formats::ExtractFormat;
pub use record::{ConceptRecord, FieldValue};
pub use semantic_types::semtype_for_tui;
pub use target_cuis::TargetCuis;
