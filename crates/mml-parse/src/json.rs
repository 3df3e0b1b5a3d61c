//! MetaMapLite JSON output parser.
//!
//! The JSON tree nests document -> utterances -> phrases -> mappings ->
//! candidates; each candidate is one scored concept mention. The top level
//! is either a single document object or an array of documents.

use std::path::Path;

use mml_model::{ConceptRecord, TargetCuis};
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    utterances: Vec<Utterance>,
}

#[derive(Debug, Deserialize)]
struct Utterance {
    #[serde(default)]
    phrases: Vec<Phrase>,
}

#[derive(Debug, Deserialize)]
struct Phrase {
    #[serde(default)]
    mappings: Vec<Mapping>,
}

#[derive(Debug, Deserialize)]
struct Mapping {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    cui: String,
    #[serde(default)]
    preferredname: String,
    #[serde(default)]
    conceptstring: Option<String>,
    #[serde(default)]
    matchedtext: String,
    start: usize,
    length: usize,
    #[serde(default)]
    negated: bool,
    #[serde(default)]
    semantictypes: Vec<String>,
    #[serde(default)]
    score: Option<f64>,
}

/// Flatten a parsed JSON tree into normalized records.
///
/// A document-scoped counter builds `event_id = {docid}_{n}`; it advances
/// once per emitted record, so when the policy fans a candidate out to
/// several target CUIs each expansion gets its own event id.
pub fn extract_mml_from_json_data(
    data: Value,
    filename: &str,
    target_cuis: &TargetCuis,
) -> Result<Vec<ConceptRecord>> {
    let documents: Vec<Document> = match data {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<serde_json::Result<_>>()?,
        value => vec![serde_json::from_value(value)?],
    };

    let docid = doc_stem(filename);
    let mut counter = 0usize;
    let mut records = Vec::new();
    for document in documents {
        for utterance in document.utterances {
            for phrase in utterance.phrases {
                for mapping in phrase.mappings {
                    for candidate in mapping.candidates {
                        emit_candidate(&candidate, &docid, filename, target_cuis, &mut counter, &mut records);
                    }
                }
            }
        }
    }
    Ok(records)
}

fn emit_candidate(
    candidate: &Candidate,
    docid: &str,
    filename: &str,
    target_cuis: &TargetCuis,
    counter: &mut usize,
    records: &mut Vec<ConceptRecord>,
) {
    for target_cui in target_cuis.get_target_cuis(&candidate.cui) {
        let mut record = ConceptRecord {
            event_id: format!("{docid}_{counter}"),
            docid: docid.to_string(),
            filename: filename.to_string(),
            start: candidate.start,
            end: candidate.start + candidate.length,
            length: candidate.length,
            matchedtext: candidate.matchedtext.clone(),
            cui: target_cui,
            conceptstring: candidate
                .conceptstring
                .clone()
                .unwrap_or_else(|| candidate.preferredname.clone()),
            preferredname: candidate.preferredname.clone(),
            semantictype: candidate.semantictypes.first().cloned().unwrap_or_default(),
            negated: candidate.negated,
            score: candidate.score,
            ..ConceptRecord::default()
        };
        for semtype in &candidate.semantictypes {
            record.set_extra(semtype.clone(), 1i64);
        }
        *counter += 1;
        records.push(record);
    }
}

/// Document id from the output file name: the stem without its extension.
fn doc_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_drops_only_the_last_extension() {
        assert_eq!(doc_stem("note1.json"), "note1");
        assert_eq!(doc_stem("00000000.tx.json"), "00000000.tx");
    }
}
