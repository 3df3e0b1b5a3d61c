//! Supported NLP engine output formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// On-disk format of NLP engine output paired with each note.
///
/// MetaMapLite emits `json` or `mmi`; cTAKES emits `xmi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractFormat {
    Json,
    Mmi,
    Xmi,
}

impl ExtractFormat {
    /// Default file extension the engine gives its output files.
    ///
    /// cTAKES renames `file.txt` to `file.txt.xmi`, so the xmi extension is
    /// compound.
    pub fn default_extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Mmi => "mmi",
            Self::Xmi => "txt.xmi",
        }
    }
}

impl fmt::Display for ExtractFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Json => "json",
            Self::Mmi => "mmi",
            Self::Xmi => "xmi",
        };
        f.write_str(tag)
    }
}

impl FromStr for ExtractFormat {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "mmi" => Ok(Self::Mmi),
            "xmi" => Ok(Self::Xmi),
            other => Err(ModelError::UnknownFormat(other.to_string())),
        }
    }
}
