//! Normalized concept records shared by all extract-format parsers.
//!
//! Every parser emits the same structural superset: the required columns are
//! always present, optional engine signals depend on the source format, and
//! `extras` carries the dynamic wide columns (one flag column per semantic
//! type or coding source seen at runtime, accumulator columns such as
//! `all_sources`). The reporting layer discovers the full column set by
//! observing records, then writes rows back through [`ConceptRecord::field`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar cell value for dynamically named columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(v) => f.write_str(v),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// One extracted concept mention, normalized across output formats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptRecord {
    /// Synthetic unique id, `{docid}_{n}` or `{docid}_{conceptid}_{n}`.
    pub event_id: String,
    /// Document stem the mention was found in.
    pub docid: String,
    /// Source output file name.
    pub filename: String,
    /// Character offset of the mention start.
    pub start: usize,
    /// Character offset one past the mention end.
    pub end: usize,
    /// `end - start`.
    pub length: usize,
    /// Surface text matched by the engine.
    pub matchedtext: String,
    /// Concept unique identifier, post target-CUI remapping.
    pub cui: String,
    /// Concept string as reported by the engine.
    pub conceptstring: String,
    /// Preferred name of the concept.
    pub preferredname: String,
    /// Primary semantic-type mnemonic.
    pub semantictype: String,
    /// True when the engine marked the mention negated.
    pub negated: bool,
    /// Engine score (MMI ranking score or XMI concept score).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// cTAKES assertion confidence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// cTAKES assertion uncertainty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<f64>,
    /// Part-of-speech tag at the start offset, when derivable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    /// Dynamic sparse wide columns (semantic-type/source flags, accumulators).
    #[serde(flatten)]
    pub extras: BTreeMap<String, FieldValue>,
}

impl ConceptRecord {
    /// Default concept-table columns, in output order.
    ///
    /// The reporting schema is seeded with these; every further column is
    /// appended as it is first observed.
    pub const DEFAULT_FIELDNAMES: [&'static str; 9] = [
        "event_id",
        "docid",
        "filename",
        "matchedtext",
        "conceptstring",
        "cui",
        "preferredname",
        "start",
        "length",
    ];

    /// Look up a column value by name.
    ///
    /// Resolves required fields first, then optional fields (absent optionals
    /// yield `None`, rendered as an empty cell), then `extras`.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "event_id" => Some(self.event_id.as_str().into()),
            "docid" => Some(self.docid.as_str().into()),
            "filename" => Some(self.filename.as_str().into()),
            "start" => Some(FieldValue::Int(self.start as i64)),
            "end" => Some(FieldValue::Int(self.end as i64)),
            "length" => Some(FieldValue::Int(self.length as i64)),
            "matchedtext" => Some(self.matchedtext.as_str().into()),
            "cui" => Some(self.cui.as_str().into()),
            "conceptstring" => Some(self.conceptstring.as_str().into()),
            "preferredname" => Some(self.preferredname.as_str().into()),
            "semantictype" => Some(self.semantictype.as_str().into()),
            "negated" => Some(FieldValue::Bool(self.negated)),
            "score" => self.score.map(FieldValue::Float),
            "confidence" => self.confidence.map(FieldValue::Float),
            "uncertainty" => self.uncertainty.map(FieldValue::Float),
            "pos" => self.pos.as_deref().map(FieldValue::from),
            other => self.extras.get(other).cloned(),
        }
    }

    /// All column names this record would populate, fixed columns first.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Self::DEFAULT_FIELDNAMES.to_vec();
        names.extend(["end", "semantictype", "negated"]);
        if self.score.is_some() {
            names.push("score");
        }
        if self.confidence.is_some() {
            names.push("confidence");
        }
        if self.uncertainty.is_some() {
            names.push("uncertainty");
        }
        if self.pos.is_some() {
            names.push("pos");
        }
        names.extend(self.extras.keys().map(String::as_str));
        names
    }

    /// Set a dynamically named column.
    pub fn set_extra(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.extras.insert(name.into(), value.into());
    }
}
