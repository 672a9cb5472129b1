use super::{escape_html, highlight, normalize_query, SearchIndex, SearchOutcome};
use crate::document::Manual;

const SCENARIO: &str = r#"{
    "chapters": [{
        "id": "c1",
        "title": {"zh": "一", "en": "One"},
        "sections": [{
            "id": "s1",
            "title": {"zh": "甲", "en": "A"},
            "blocks": [{"type": "text", "zh": "內容", "en": "content"}]
        }]
    }]
}"#;

fn sample() -> Manual {
    Manual::from_json(include_str!("../../assets/manual.json")).unwrap()
}

fn matched_ids<'a>(outcome: &SearchOutcome<'a>) -> Vec<&'a str> {
    match outcome {
        SearchOutcome::Matches(records) => records.iter().map(|r| r.section_id.as_str()).collect(),
        SearchOutcome::Unfiltered => panic!("expected a filtered outcome"),
    }
}

#[test]
fn test_record_text_layout() {
    let manual = Manual::from_json(SCENARIO).unwrap();
    let index = SearchIndex::build(&manual, "en");

    assert_eq!(index.records().len(), 1);
    let record = &index.records()[0];
    assert_eq!(record.chapter_id, "c1");
    assert_eq!(record.group_id, "c1-grp-default");
    assert_eq!(record.section_id, "s1");
    assert_eq!(record.text, "one general a content ");
}

#[test]
fn test_scenario_query_finds_single_section() {
    let manual = Manual::from_json(SCENARIO).unwrap();
    let index = SearchIndex::build(&manual, "en");

    assert_eq!(matched_ids(&index.query("content")), ["s1"]);
    assert_eq!(matched_ids(&index.query("  CONTENT ")), ["s1"]);
}

#[test]
fn test_blank_query_is_unfiltered_not_empty() {
    let index = SearchIndex::build(&sample(), "en");

    assert_eq!(index.query(""), SearchOutcome::Unfiltered);
    assert_eq!(index.query("   "), SearchOutcome::Unfiltered);
    assert_eq!(index.query("zzz-no-match"), SearchOutcome::Matches(Vec::new()));
}

#[test]
fn test_tables_are_indexed_images_are_not() {
    let index = SearchIndex::build(&sample(), "en");

    assert_eq!(matched_ids(&index.query("frequency")), ["sec-02"]);
    assert_eq!(matched_ids(&index.query("rating")), ["sec-02"]);
    assert!(matched_ids(&index.query("box contents")).is_empty());
}

#[test]
fn test_results_keep_reading_order() {
    let index = SearchIndex::build(&sample(), "en");

    // "the" occurs in the bodies of the first and last sections only.
    assert_eq!(matched_ids(&index.query("the")), ["sec-01", "sec-03"]);
    assert_eq!(
        matched_ids(&index.query("getting started")),
        ["sec-01", "sec-02"]
    );
}

#[test]
fn test_index_only_holds_active_language() {
    let manual = sample();
    let en = SearchIndex::build(&manual, "en");
    let zh = SearchIndex::build(&manual, "zh");

    assert!(matched_ids(&en.query("電壓")).is_empty());
    assert_eq!(matched_ids(&zh.query("電壓")), ["sec-02"]);
    assert_eq!(en.language(), "en");
}

#[test]
fn test_language_round_trip_rebuilds_identically() {
    let manual = sample();
    let original = SearchIndex::build(&manual, "zh");

    let switched = SearchIndex::build(&manual, "en");
    assert_ne!(switched, original);
    let back = SearchIndex::build(&manual, "zh");

    assert_eq!(back, original);
}

#[test]
fn test_highlight_escapes_before_marking() {
    assert_eq!(
        highlight("5 < 10 & ok", "ok"),
        "5 &lt; 10 &amp; <mark>ok</mark>"
    );
}

#[test]
fn test_highlight_empty_query_only_escapes() {
    assert_eq!(highlight("<b>\"x\"</b>", ""), escape_html("<b>\"x\"</b>"));
    assert_eq!(highlight("it's", "  "), "it&#39;s");
}

#[test]
fn test_highlight_is_case_insensitive_and_keeps_case() {
    assert_eq!(
        highlight("OK then, ok", "ok"),
        "<mark>OK</mark> then, <mark>ok</mark>"
    );
}

#[test]
fn test_highlight_treats_query_literally() {
    assert_eq!(highlight("a.b axb", "."), "a<mark>.</mark>b axb");
    assert_eq!(highlight("(1+1)", "1+1"), "(<mark>1+1</mark>)");
}

#[test]
fn test_highlight_matches_escaped_text() {
    assert_eq!(highlight("5 < 10", "<"), "5 &lt; 10");
    assert_eq!(highlight("5 < 10", "&lt;"), "5 <mark>&lt;</mark> 10");
    assert_eq!(highlight("a & b", "amp"), "a &<mark>amp</mark>; b");
    assert_eq!(highlight("say \"hi\"", "\""), "say &quot;hi&quot;");
}

#[test]
fn test_normalize_query() {
    assert_eq!(normalize_query("  Power LED "), "power led");
}
