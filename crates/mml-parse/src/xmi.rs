//! cTAKES XMI annotation parser.
//!
//! XMI files carry no inline document text; instead three interleaved
//! annotation layers reference character offsets into the original note:
//!
//! - dependency-parse tokens (`syntax.ecore` ConllDependencyNode) with
//!   offsets, surface form and POS tag, from which an approximate document
//!   text and an offset -> POS lookup are reconstructed;
//! - semantic mentions (`textsem.ecore`) holding offsets, polarity and an
//!   array of internal concept-reference ids;
//! - concept references (`refsem.ecore`) resolved by id, holding the CUI,
//!   TUI, coding scheme and score.
//!
//! References may appear after the mentions that point at them, so records
//! accumulate in an id-keyed map and are emitted only after the full pass.
//! When the policy fans one reference out to several target CUIs, the last
//! write wins on the shared record slot; this narrowing is inherited from
//! the original pipeline and deliberately left in place.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use mml_model::{ConceptRecord, FieldValue, TargetCuis, semtype_for_tui};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use tracing::debug;

use crate::dispatch::ExtractOptions;
use crate::error::{ParseError, Result};

/// Which annotation layer an element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Token,
    Mention,
    Reference,
}

/// One relevant element, flattened to its attributes.
#[derive(Debug)]
struct Element {
    layer: Layer,
    name: String,
    attrs: HashMap<String, String>,
}

impl Element {
    fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn require(&self, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| ParseError::MissingAttribute {
            element: self.name.clone(),
            attribute: name.to_string(),
        })
    }

    fn require_usize(&self, name: &str) -> Result<usize> {
        let raw = self.require(name)?;
        raw.parse()
            .map_err(|_| ParseError::invalid("xmi offset", raw))
    }

    fn require_f64(&self, name: &str) -> Result<f64> {
        let raw = self.require(name)?;
        raw.parse()
            .map_err(|_| ParseError::invalid("xmi number", raw))
    }

    fn get_bool(&self, name: &str) -> bool {
        matches!(self.get(name), Some("true") | Some("1"))
    }
}

/// Record under construction, keyed by internal concept-reference id.
#[derive(Debug, Clone, Default)]
struct PendingConcept {
    event_id: Option<String>,
    start: usize,
    end: usize,
    negated: bool,
    confidence: Option<f64>,
    uncertainty: Option<f64>,
    conditional: Option<bool>,
    generic: Option<bool>,
    subject: Option<String>,
    matchedtext: String,
    pos: Option<String>,
    cui: Option<String>,
    source: Option<String>,
    tui: Option<String>,
    semantictype: Option<String>,
    score: Option<f64>,
    preferredname: Option<String>,
    code: Option<String>,
    all_sources: Vec<String>,
    all_semantictypes: Vec<String>,
    extras: BTreeMap<String, FieldValue>,
}

/// Parse one XMI file into normalized records.
pub fn extract_mml_from_xmi_data(
    text: &str,
    filename: &str,
    target_cuis: &TargetCuis,
    options: &ExtractOptions,
) -> Result<Vec<ConceptRecord>> {
    let elements = collect_elements(text)?;
    let (doc_text, postags) = build_index_references(&elements)?;
    let stem = doc_stem(filename);

    let base = PendingConcept {
        extras: options.extras.clone(),
        ..PendingConcept::default()
    };
    let mut results: BTreeMap<i64, PendingConcept> = BTreeMap::new();
    let mut remove_concept_ids: HashSet<i64> = HashSet::new();
    let mut counter = 0usize;

    for element in &elements {
        match element.layer {
            Layer::Token => {}
            Layer::Mention => {
                let Some(concept_arr) = element.get("ontologyConceptArr") else {
                    continue;
                };
                let raw_polarity = element.require("polarity")?;
                let polarity: i64 = raw_polarity
                    .parse()
                    .map_err(|_| ParseError::invalid("xmi polarity", raw_polarity))?;
                let start = element.require_usize("begin")?;
                let end = element.require_usize("end")?;
                if end < start {
                    return Err(ParseError::invalid(
                        "xmi mention span",
                        format!("{start}..{end}"),
                    ));
                }
                let confidence = element.require_f64("confidence")?;
                let uncertainty = element.require_f64("uncertainty")?;
                let conditional = element.get_bool("conditional");
                let generic = element.get_bool("generic");
                let subject = element.get("subject").map(ToString::to_string);

                for (j, concept) in concept_arr.split_whitespace().enumerate() {
                    let concept_id: i64 = concept
                        .parse()
                        .map_err(|_| ParseError::invalid("xmi concept id", concept))?;
                    if j >= 1 && options.skip_repeat_concepts {
                        // same CUI under a different coding; the reference
                        // layer will still populate it, so flag for removal
                        remove_concept_ids.insert(concept_id);
                        continue;
                    }
                    let pos = postags
                        .get(&start)
                        .ok_or(ParseError::PosLookup { offset: start })?
                        .clone();
                    let pending = results
                        .entry(concept_id)
                        .or_insert_with(|| base.clone());
                    pending.event_id = Some(format!("{stem}_{concept_id}_{counter}"));
                    pending.start = start;
                    pending.end = end;
                    pending.negated = polarity <= 0;
                    pending.confidence = Some(confidence);
                    pending.uncertainty = Some(uncertainty);
                    pending.conditional = Some(conditional);
                    pending.generic = Some(generic);
                    pending.subject = subject.clone();
                    pending.matchedtext = slice_chars(&doc_text, start, end);
                    pending.pos = Some(pos);
                    counter += 1;
                }
            }
            Layer::Reference => {
                let currid: i64 = {
                    let raw = element.require("xmi:id")?;
                    raw.parse()
                        .map_err(|_| ParseError::invalid("xmi reference id", raw))?
                };
                let tui = element.get("tui").map(ToString::to_string);
                let semtype = tui
                    .as_deref()
                    .and_then(semtype_for_tui)
                    .map(ToString::to_string);
                let source = element.get("codingScheme").map(ToString::to_string);

                let already_sourced = results
                    .get(&currid)
                    .is_some_and(|pending| pending.source.is_some());
                if already_sourced {
                    // a second coding of the same mention: accumulate
                    if let Some(pending) = results.get_mut(&currid) {
                        pending
                            .all_sources
                            .push(source.clone().unwrap_or_default());
                        pending
                            .all_semantictypes
                            .push(semtype.clone().unwrap_or_default());
                        if let Some(semtype) = &semtype {
                            pending.extras.insert(semtype.clone(), FieldValue::Int(1));
                        }
                        if let Some(source) = &source {
                            pending.extras.insert(source.clone(), FieldValue::Int(1));
                        }
                    }
                } else {
                    let raw_cui = element.get("cui").unwrap_or_default();
                    let score = element.require_f64("score")?;
                    let preferred = element.get("preferredText").map(ToString::to_string);
                    let code = element.get("code").map(ToString::to_string);
                    let pending = results
                        .entry(currid)
                        .or_insert_with(|| base.clone());
                    for cui in target_cuis.get_target_cuis(raw_cui) {
                        // fan-out shares one slot: last write wins (see
                        // module docs)
                        pending.source = source.clone();
                        pending.cui = Some(cui);
                        pending.preferredname = preferred.clone();
                        pending.tui = tui.clone();
                        pending.semantictype = semtype.clone();
                        pending.score = Some(score);
                        pending.code = code.clone();
                        pending.all_sources = vec![source.clone().unwrap_or_default()];
                        pending.all_semantictypes = vec![semtype.clone().unwrap_or_default()];
                        if let Some(semtype) = &semtype {
                            pending.extras.insert(semtype.clone(), FieldValue::Int(1));
                        }
                    }
                }
            }
        }
    }

    let mut records = Vec::new();
    for (concept_id, pending) in results {
        if remove_concept_ids.contains(&concept_id) {
            continue;
        }
        if target_cuis.is_empty()
            || pending
                .cui
                .as_deref()
                .is_some_and(|cui| target_cuis.contains(cui))
        {
            records.push(pending.into_record(filename, &stem));
        } else {
            debug!(concept_id, "dropping mention outside target cuis");
        }
    }
    Ok(records)
}

impl PendingConcept {
    fn into_record(self, filename: &str, stem: &str) -> ConceptRecord {
        let mut extras = self.extras;
        if !self.all_sources.is_empty() {
            extras.insert(
                "all_sources".to_string(),
                FieldValue::Str(self.all_sources.join(",")),
            );
            extras.insert(
                "all_semantictypes".to_string(),
                FieldValue::Str(self.all_semantictypes.join(",")),
            );
        }
        if let Some(conditional) = self.conditional {
            extras.insert("conditional".to_string(), FieldValue::Bool(conditional));
        }
        if let Some(generic) = self.generic {
            extras.insert("generic".to_string(), FieldValue::Bool(generic));
        }
        if let Some(subject) = self.subject {
            extras.insert("subject".to_string(), FieldValue::Str(subject));
        }
        if let Some(source) = self.source {
            extras.insert("source".to_string(), FieldValue::Str(source));
        }
        if let Some(tui) = self.tui {
            extras.insert("tui".to_string(), FieldValue::Str(tui));
        }
        if let Some(code) = self.code {
            extras.insert("code".to_string(), FieldValue::Str(code));
        }
        let preferredname = self.preferredname.unwrap_or_default();
        ConceptRecord {
            event_id: self.event_id.unwrap_or_default(),
            docid: stem.to_string(),
            filename: filename.to_string(),
            start: self.start,
            end: self.end,
            length: self.end - self.start,
            matchedtext: self.matchedtext,
            cui: self.cui.unwrap_or_default(),
            conceptstring: preferredname.clone(),
            preferredname,
            semantictype: self.semantictype.unwrap_or_default(),
            negated: self.negated,
            score: self.score,
            confidence: self.confidence,
            uncertainty: self.uncertainty,
            pos: self.pos,
            extras,
        }
    }
}

/// Reconstruct the approximate document text and the offset -> POS lookup
/// from the token layer.
///
/// Tokens are placed at their begin offset with space padding between them;
/// the engine supplies them in document order, so a running previous-end
/// offset is enough. The root dependency node (`xmi:id="0"`) carries no
/// surface form and is skipped.
fn build_index_references(elements: &[Element]) -> Result<(String, HashMap<usize, String>)> {
    let mut prev_index = 1usize;
    let mut text = String::new();
    let mut postags = HashMap::new();
    for element in elements {
        if element.layer != Layer::Token || element.get("id") == Some("0") {
            continue;
        }
        let begin = element.require_usize("begin")?;
        let end = element.require_usize("end")?;
        let form = element.require("form")?;
        if let Some(postag) = element.get("postag") {
            postags.insert(begin, postag.to_string());
        }
        for _ in 0..begin.saturating_sub(prev_index) {
            text.push(' ');
        }
        text.push_str(form);
        prev_index = end;
    }
    Ok((text, postags))
}

/// Single pass over the XML, keeping only the three layers of interest.
fn collect_elements(text: &str) -> Result<Vec<Element>> {
    let mut reader = NsReader::from_str(text);
    let mut elements = Vec::new();
    loop {
        let (layer, local, start) = match reader.read_resolved_event()? {
            (ResolveResult::Bound(Namespace(ns)), Event::Start(start))
            | (ResolveResult::Bound(Namespace(ns)), Event::Empty(start)) => {
                let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                let layer = if contains(ns, b"syntax.ecore") && local == "ConllDependencyNode" {
                    Some(Layer::Token)
                } else if contains(ns, b"textsem.ecore") {
                    Some(Layer::Mention)
                } else if contains(ns, b"refsem.ecore") {
                    Some(Layer::Reference)
                } else {
                    None
                };
                match layer {
                    Some(layer) => (layer, local, start),
                    None => continue,
                }
            }
            (_, Event::Eof) => break,
            _ => continue,
        };
        elements.push(Element {
            layer,
            attrs: read_attrs(&reader, &start)?,
            name: local,
        });
    }
    Ok(elements)
}

const XMI_NAMESPACE: &[u8] = b"http://www.omg.org/XMI";

/// Flatten the attributes, unescaping values (named and numeric character
/// references) via the parser. Attributes bound to the XMI namespace are
/// keyed `xmi:{local}` regardless of the prefix the document chose.
fn read_attrs(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for attr in start.attributes() {
        let attr = attr?;
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let local = String::from_utf8_lossy(local.as_ref()).into_owned();
        let key = match resolved {
            ResolveResult::Bound(Namespace(ns)) if ns == XMI_NAMESPACE => format!("xmi:{local}"),
            _ => local,
        };
        attrs.insert(key, attr.unescape_value()?.into_owned());
    }
    Ok(attrs)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}

/// Character-offset slice of the reconstructed text, clamped like the
/// original pipeline's slicing.
fn slice_chars(text: &str, start: usize, end: usize) -> String {
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

/// Document stem: file stem with any `.txt` component removed (cTAKES names
/// output `note.txt.xmi`).
fn doc_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
        .replace(".txt", "")
}
