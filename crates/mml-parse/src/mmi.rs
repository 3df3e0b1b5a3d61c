//! MetaMapLite MMI (fielded) output parser.
//!
//! One pipe-delimited line per concept; a line carries one CUI with one or
//! more positional occurrences, so one line can yield several records. Only
//! lines tagged `MMI` are concept records: other tags (`AA` abbreviation
//! expansions, `UA` user-defined expansions) are skipped silently.

use mml_model::{ConceptRecord, TargetCuis};
use tracing::debug;

use crate::error::{ParseError, Result};

/// Field tag marking a concept line.
const MMI_TAG: &str = "MMI";

/// Number of `|`-separated fields a concept line carries (treecodes last).
const MMI_FIELD_COUNT: usize = 10;

/// Parse a whole MMI output file.
///
/// Records share a per-document event counter so event ids stay unique
/// across lines.
pub fn extract_mml_from_mmi_data(
    text: &str,
    filename: &str,
    target_cuis: &TargetCuis,
) -> Result<Vec<ConceptRecord>> {
    let mut records = Vec::new();
    let mut counter = 0usize;
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('|').collect();
        if let Some(parsed) = extract_mmi_line(&fields, filename, &mut counter, target_cuis)? {
            records.extend(parsed);
        }
    }
    Ok(records)
}

/// Parse one `|`-split MMI line into zero or more records.
///
/// Returns `None` for lines that are not concept records (wrong tag or too
/// few fields). A record is emitted per positional occurrence and per target
/// CUI the policy maps the line's CUI onto; a CUI the policy maps to nothing
/// drops the line entirely.
///
/// # Errors
///
/// Bracketed multi-span positional info (`[a/b],[c/d]`) is an unsupported
/// input shape and fails the parse rather than being guessed at.
pub fn extract_mmi_line(
    fields: &[&str],
    filename: &str,
    counter: &mut usize,
    target_cuis: &TargetCuis,
) -> Result<Option<Vec<ConceptRecord>>> {
    if fields.len() < MMI_FIELD_COUNT - 1 || fields[1] != MMI_TAG {
        debug!(tag = fields.get(1).copied().unwrap_or_default(), "skipping non-MMI line");
        return Ok(None);
    }
    let docid = fields[0];
    let score: f64 = fields[2]
        .parse()
        .map_err(|_| ParseError::invalid("mmi score", fields[2]))?;
    let preferredname = fields[3];
    let cui = fields[4];
    let semantictypes: Vec<&str> = fields[5]
        .trim_matches(['[', ']'])
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let trigger = fields[6];
    let positions = fields[8];

    let matchedtext = trigger.split('"').nth(1).unwrap_or(preferredname);
    let negated = trigger_negation_flag(trigger);

    let mut records = Vec::new();
    for span in positions.split(';') {
        if span.contains('[') || span.contains(',') {
            return Err(ParseError::UnsupportedSpan {
                value: positions.to_string(),
            });
        }
        let (start, length) = parse_span(span)?;
        for target_cui in target_cuis.get_target_cuis(cui) {
            let mut record = ConceptRecord {
                event_id: format!("{docid}_{counter}"),
                docid: docid.to_string(),
                filename: filename.to_string(),
                start,
                end: start + length,
                length,
                matchedtext: matchedtext.to_string(),
                cui: target_cui,
                conceptstring: preferredname.to_string(),
                preferredname: preferredname.to_string(),
                semantictype: semantictypes.first().copied().unwrap_or_default().to_string(),
                negated,
                score: Some(score),
                ..ConceptRecord::default()
            };
            for semtype in &semantictypes {
                record.set_extra(*semtype, 1i64);
            }
            *counter += 1;
            records.push(record);
        }
    }
    Ok(Some(records))
}

/// Parse one `offset/length` element of the positions field.
fn parse_span(span: &str) -> Result<(usize, usize)> {
    let (start, length) = span
        .split_once('/')
        .ok_or_else(|| ParseError::invalid("mmi positional info", span))?;
    let start = start
        .trim()
        .parse()
        .map_err(|_| ParseError::invalid("mmi offset", start))?;
    let length = length
        .trim()
        .parse()
        .map_err(|_| ParseError::invalid("mmi length", length))?;
    Ok((start, length))
}

/// Negation sentinel from the trigger field.
///
/// Each comma-separated trigger tuple ends in `-<flag>`; the mention is
/// negated when the flag of the first tuple is `1`.
fn trigger_negation_flag(trigger: &str) -> bool {
    trigger
        .split(',')
        .next()
        .and_then(|tuple| tuple.rsplit('-').next())
        .map(str::trim)
        == Some("1")
}
