//! Format-specific parsers turning NLP engine output into normalized
//! [`ConceptRecord`](mml_model::ConceptRecord)s.
//!
//! Three heterogeneous formats are supported: MetaMapLite's fielded MMI
//! lines, MetaMapLite's nested JSON tree, and cTAKES XMI annotation files.
//! All three apply the same target-CUI remapping/filtering policy and emit
//! the same record schema; [`dispatch::extract_mml_data`] selects the parser
//! from the configured format tag.

pub mod dispatch;
pub mod error;
pub mod json;
pub mod mmi;
pub mod xmi;

pub use dispatch::{
    DEFAULT_EXTRACT_ENCODING, DEFAULT_NOTE_ENCODING, ExtractOptions, decode_file,
    extract_mml_data,
};
pub use error::{ParseError, Result};
pub use json::extract_mml_from_json_data;
pub use mmi::{extract_mmi_line, extract_mml_from_mmi_data};
pub use xmi::extract_mml_from_xmi_data;
