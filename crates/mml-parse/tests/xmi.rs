//! cTAKES XMI parser behavior: text reconstruction, the mention/reference
//! join, repeat-concept handling, and the final target-CUI filter.

use mml_model::{ExtractFormat, FieldValue, TargetCuis};
use mml_parse::{ExtractOptions, ParseError, extract_mml_from_xmi_data};

fn xmi_document(body: &str) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<xmi:XMI xmlns:xmi=\"http://www.omg.org/XMI\"",
            " xmlns:syntax=\"http:///org/apache/ctakes/typesystem/type/syntax.ecore\"",
            " xmlns:textsem=\"http:///org/apache/ctakes/typesystem/type/textsem.ecore\"",
            " xmlns:refsem=\"http:///org/apache/ctakes/typesystem/type/refsem.ecore\">\n",
            "{body}\n",
            "</xmi:XMI>"
        ),
        body = body
    )
}

const TOKENS: &str = concat!(
    "<syntax:ConllDependencyNode xmi:id=\"10\" id=\"0\"/>\n",
    "<syntax:ConllDependencyNode xmi:id=\"11\" id=\"1\" begin=\"0\" end=\"5\" form=\"chest\" postag=\"NN\"/>\n",
    "<syntax:ConllDependencyNode xmi:id=\"12\" id=\"2\" begin=\"6\" end=\"10\" form=\"pain\" postag=\"NN\"/>",
);

fn mention(concept_arr: &str, polarity: i64) -> String {
    format!(
        "<textsem:SignSymptomMention xmi:id=\"20\" begin=\"0\" end=\"10\" polarity=\"{polarity}\" \
         confidence=\"0.9\" uncertainty=\"0\" conditional=\"false\" generic=\"false\" \
         subject=\"patient\" ontologyConceptArr=\"{concept_arr}\"/>"
    )
}

fn mention_spanning(concept_arr: &str, begin: usize, end: usize) -> String {
    format!(
        "<textsem:SignSymptomMention xmi:id=\"20\" begin=\"{begin}\" end=\"{end}\" polarity=\"1\" \
         confidence=\"0.9\" uncertainty=\"0\" conditional=\"false\" generic=\"false\" \
         subject=\"patient\" ontologyConceptArr=\"{concept_arr}\"/>"
    )
}

fn umls_concept(id: u32, cui: &str, scheme: &str, code: &str) -> String {
    format!(
        "<refsem:UmlsConcept xmi:id=\"{id}\" cui=\"{cui}\" tui=\"T184\" codingScheme=\"{scheme}\" \
         score=\"0.0\" preferredText=\"Chest Pain\" code=\"{code}\"/>"
    )
}

fn options() -> ExtractOptions {
    ExtractOptions::for_format(ExtractFormat::Xmi)
}

#[test]
fn mention_with_repeated_concepts_yields_one_record() {
    let body = format!(
        "{TOKENS}\n{}\n{}\n{}",
        mention("30 31", 1),
        umls_concept(30, "C0008031", "SNOMEDCT_US", "29857009"),
        umls_concept(31, "C0008031", "ICD10CM", "R07.9"),
    );
    let records = extract_mml_from_xmi_data(
        &xmi_document(&body),
        "note1.txt.xmi",
        &TargetCuis::new(),
        &options(),
    )
    .unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.event_id, "note1_30_0");
    assert_eq!(record.docid, "note1");
    assert_eq!(record.filename, "note1.txt.xmi");
    assert_eq!(record.matchedtext, "chest pain");
    assert_eq!(record.start, 0);
    assert_eq!(record.end, 10);
    assert_eq!(record.length, 10);
    assert_eq!(record.cui, "C0008031");
    assert_eq!(record.semantictype, "sosy");
    assert_eq!(record.preferredname, "Chest Pain");
    assert_eq!(record.pos.as_deref(), Some("NN"));
    assert!(!record.negated);
    assert_eq!(record.confidence, Some(0.9));
    assert_eq!(record.field("tui"), Some(FieldValue::Str("T184".into())));
    assert_eq!(record.field("code"), Some(FieldValue::Str("29857009".into())));
    assert_eq!(record.field("subject"), Some(FieldValue::Str("patient".into())));
    assert_eq!(record.field("sosy"), Some(FieldValue::Int(1)));
    assert_eq!(
        record.field("all_sources"),
        Some(FieldValue::Str("SNOMEDCT_US".into()))
    );
}

#[test]
fn repeats_kept_when_configured() {
    let body = format!(
        "{TOKENS}\n{}\n{}\n{}",
        mention("30 31", 1),
        umls_concept(30, "C0008031", "SNOMEDCT_US", "29857009"),
        umls_concept(31, "C0008031", "ICD10CM", "R07.9"),
    );
    let mut opts = options();
    opts.skip_repeat_concepts = false;
    let records = extract_mml_from_xmi_data(
        &xmi_document(&body),
        "note1.txt.xmi",
        &TargetCuis::new(),
        &opts,
    )
    .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].event_id, "note1_30_0");
    assert_eq!(records[1].event_id, "note1_31_1");
}

#[test]
fn second_coding_of_same_reference_id_accumulates() {
    let body = format!(
        "{TOKENS}\n{}\n{}\n{}",
        mention("30", 1),
        umls_concept(30, "C0008031", "SNOMEDCT_US", "29857009"),
        umls_concept(30, "C0008031", "ICD10CM", "R07.9"),
    );
    let records = extract_mml_from_xmi_data(
        &xmi_document(&body),
        "note1.txt.xmi",
        &TargetCuis::new(),
        &options(),
    )
    .unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(
        record.field("all_sources"),
        Some(FieldValue::Str("SNOMEDCT_US,ICD10CM".into()))
    );
    assert_eq!(
        record.field("all_semantictypes"),
        Some(FieldValue::Str("sosy,sosy".into()))
    );
    assert_eq!(record.field("ICD10CM"), Some(FieldValue::Int(1)));
    // the first coding's fields stay in place
    assert_eq!(record.field("code"), Some(FieldValue::Str("29857009".into())));
}

#[test]
fn negation_follows_polarity() {
    let body = format!(
        "{TOKENS}\n{}\n{}",
        mention("30", -1),
        umls_concept(30, "C0008031", "SNOMEDCT_US", "29857009"),
    );
    let records = extract_mml_from_xmi_data(
        &xmi_document(&body),
        "note1.txt.xmi",
        &TargetCuis::new(),
        &options(),
    )
    .unwrap();
    assert!(records[0].negated);
}

#[test]
fn token_placement_matches_offsets() {
    // every token's span in the reconstructed text equals its surface form,
    // exercised through mention slices over each token
    let body = format!(
        "{TOKENS}\n{}\n{}",
        "<textsem:AnatomicalSiteMention xmi:id=\"21\" begin=\"6\" end=\"10\" polarity=\"1\" \
         confidence=\"1.0\" uncertainty=\"0\" conditional=\"false\" generic=\"false\" \
         subject=\"patient\" ontologyConceptArr=\"40\"/>",
        umls_concept(40, "C0030193", "SNOMEDCT_US", "22253000"),
    );
    let records = extract_mml_from_xmi_data(
        &xmi_document(&body),
        "note1.txt.xmi",
        &TargetCuis::new(),
        &options(),
    )
    .unwrap();
    assert_eq!(records[0].matchedtext, "pain");
}

#[test]
fn missing_token_layer_is_fatal_for_mentions() {
    let body = format!(
        "{}\n{}",
        mention("30", 1),
        umls_concept(30, "C0008031", "SNOMEDCT_US", "29857009"),
    );
    let err = extract_mml_from_xmi_data(
        &xmi_document(&body),
        "note1.txt.xmi",
        &TargetCuis::new(),
        &options(),
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::PosLookup { offset: 0 }));
}

#[test]
fn final_pass_applies_target_cui_filter() {
    let body = format!(
        "{TOKENS}\n{}\n{}",
        mention("30", 1),
        umls_concept(30, "C0008031", "SNOMEDCT_US", "29857009"),
    );
    let mut other = TargetCuis::new();
    other.add("C0011849", Vec::<String>::new());
    let records = extract_mml_from_xmi_data(
        &xmi_document(&body),
        "note1.txt.xmi",
        &other,
        &options(),
    )
    .unwrap();
    assert!(records.is_empty());

    let mut mapped = TargetCuis::new();
    mapped.add("C0008031", ["C0000001"]);
    let records = extract_mml_from_xmi_data(
        &xmi_document(&body),
        "note1.txt.xmi",
        &mapped,
        &options(),
    )
    .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].cui, "C0000001");
}

#[test]
fn extras_base_is_copied_into_every_record() {
    let body = format!(
        "{TOKENS}\n{}\n{}",
        mention("30", 1),
        umls_concept(30, "C0008031", "SNOMEDCT_US", "29857009"),
    );
    let mut opts = options();
    opts.extras.insert("batch".to_string(), FieldValue::Str("run7".into()));
    let records = extract_mml_from_xmi_data(
        &xmi_document(&body),
        "note1.txt.xmi",
        &TargetCuis::new(),
        &opts,
    )
    .unwrap();
    assert_eq!(records[0].field("batch"), Some(FieldValue::Str("run7".into())));
}

#[test]
fn numeric_character_references_keep_offsets_aligned() {
    // control characters in token forms arrive as numeric references; the
    // decoded form must occupy exactly end - begin characters so later
    // mention slices line up
    let body = format!(
        "{}\n{}\n{}\n{}",
        "<syntax:ConllDependencyNode xmi:id=\"10\" id=\"0\"/>",
        "<syntax:ConllDependencyNode xmi:id=\"11\" id=\"1\" begin=\"0\" end=\"3\" \
         form=\"a&#10;b\" postag=\"NN\"/>",
        mention_spanning("30", 0, 3),
        umls_concept(30, "C0008031", "SNOMEDCT_US", "29857009"),
    );
    let records = extract_mml_from_xmi_data(
        &xmi_document(&body),
        "note1.txt.xmi",
        &TargetCuis::new(),
        &options(),
    )
    .unwrap();
    assert_eq!(records[0].matchedtext, "a\nb");
    assert_eq!(records[0].length, 3);
}

#[test]
fn fanout_to_multiple_targets_keeps_the_last() {
    // one reference mapped to several targets shares a single record slot,
    // so only the last mapped CUI survives
    let body = format!(
        "{TOKENS}\n{}\n{}",
        mention("30", 1),
        umls_concept(30, "C0008031", "SNOMEDCT_US", "29857009"),
    );
    let mut mapped = TargetCuis::new();
    mapped.add("C0008031", ["C0000001", "C0000002"]);
    let records = extract_mml_from_xmi_data(
        &xmi_document(&body),
        "note1.txt.xmi",
        &mapped,
        &options(),
    )
    .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].cui, "C0000002");
}

#[test]
fn xmi_namespace_prefix_is_not_fixed() {
    // same document, but the XMI namespace bound to a different prefix
    let document = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<x:XMI xmlns:x=\"http://www.omg.org/XMI\"",
        " xmlns:syntax=\"http:///org/apache/ctakes/typesystem/type/syntax.ecore\"",
        " xmlns:textsem=\"http:///org/apache/ctakes/typesystem/type/textsem.ecore\"",
        " xmlns:refsem=\"http:///org/apache/ctakes/typesystem/type/refsem.ecore\">\n",
        "<syntax:ConllDependencyNode x:id=\"10\" id=\"0\"/>\n",
        "<syntax:ConllDependencyNode x:id=\"11\" id=\"1\" begin=\"0\" end=\"5\" \
             form=\"chest\" postag=\"NN\"/>\n",
        "<textsem:SignSymptomMention x:id=\"20\" begin=\"0\" end=\"5\" polarity=\"1\" \
             confidence=\"0.9\" uncertainty=\"0\" conditional=\"false\" generic=\"false\" \
             subject=\"patient\" ontologyConceptArr=\"30\"/>\n",
        "<refsem:UmlsConcept x:id=\"30\" cui=\"C0008031\" tui=\"T184\" \
             codingScheme=\"SNOMEDCT_US\" score=\"0.0\" preferredText=\"Chest Pain\" \
             code=\"29857009\"/>\n",
        "</x:XMI>"
    );
    let records = extract_mml_from_xmi_data(
        document,
        "note1.txt.xmi",
        &TargetCuis::new(),
        &options(),
    )
    .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].event_id, "note1_30_0");
    assert_eq!(records[0].cui, "C0008031");
}

#[test]
fn inverted_mention_span_is_an_error() {
    let body = format!(
        "{TOKENS}\n{}\n{}",
        mention_spanning("30", 5, 2),
        umls_concept(30, "C0008031", "SNOMEDCT_US", "29857009"),
    );
    let err = extract_mml_from_xmi_data(
        &xmi_document(&body),
        "note1.txt.xmi",
        &TargetCuis::new(),
        &options(),
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::InvalidValue { .. }));
}

#[test]
fn reparse_is_deterministic() {
    let body = format!(
        "{TOKENS}\n{}\n{}\n{}",
        mention("30 31", 1),
        umls_concept(30, "C0008031", "SNOMEDCT_US", "29857009"),
        umls_concept(31, "C0008031", "ICD10CM", "R07.9"),
    );
    let document = xmi_document(&body);
    let first =
        extract_mml_from_xmi_data(&document, "note1.txt.xmi", &TargetCuis::new(), &options())
            .unwrap();
    let second =
        extract_mml_from_xmi_data(&document, "note1.txt.xmi", &TargetCuis::new(), &options())
            .unwrap();
    assert_eq!(first, second);
}
