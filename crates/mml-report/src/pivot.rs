//! Document-by-CUI pivot built from a finished concept table.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::Context;
use mml_model::TargetCuis;
use tracing::info;

/// Read the concept table at `mml_file` and write a pivot CSV to `outfile`.
///
/// The pivot has one row per document and one column per CUI, each cell being
/// the mention count for that pair. Every CUI in the target policy gets a
/// column even when no document mentions it, so downstream joins see a stable
/// column set across runs.
pub fn build_pivot_table(
    mml_file: &Path,
    outfile: &Path,
    target_cuis: &TargetCuis,
) -> anyhow::Result<()> {
    let mut reader = csv::Reader::from_path(mml_file)
        .with_context(|| format!("reading concept table {}", mml_file.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("reading concept table header from {}", mml_file.display()))?;
    let docid_idx = column_index(headers, "docid", mml_file)?;
    let cui_idx = column_index(headers, "cui", mml_file)?;

    let mut counts: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    let mut cuis: BTreeSet<String> = target_cuis.values().into_iter().collect();
    for result in reader.records() {
        let row = result
            .with_context(|| format!("reading concept row from {}", mml_file.display()))?;
        let docid = row.get(docid_idx).unwrap_or_default().to_string();
        let cui = row.get(cui_idx).unwrap_or_default().to_string();
        if docid.is_empty() || cui.is_empty() {
            continue;
        }
        cuis.insert(cui.clone());
        *counts.entry(docid).or_default().entry(cui).or_default() += 1;
    }
    info!(
        documents = counts.len(),
        cuis = cuis.len(),
        "building document-by-cui pivot"
    );

    let mut writer = csv::Writer::from_path(outfile)
        .with_context(|| format!("creating pivot table {}", outfile.display()))?;
    let mut header = vec!["docid".to_string()];
    header.extend(cuis.iter().cloned());
    writer
        .write_record(&header)
        .with_context(|| format!("writing pivot header to {}", outfile.display()))?;
    for (docid, doc_counts) in &counts {
        let mut row = vec![docid.clone()];
        for cui in &cuis {
            row.push(doc_counts.get(cui).copied().unwrap_or(0).to_string());
        }
        writer
            .write_record(&row)
            .with_context(|| format!("writing pivot row to {}", outfile.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing pivot table {}", outfile.display()))
}

fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> anyhow::Result<usize> {
    headers
        .iter()
        .position(|column| column == name)
        .with_context(|| format!("concept table {} has no `{name}` column", path.display()))
}
