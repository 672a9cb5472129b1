use super::{NavState, NodeKey};
use crate::document::Manual;
use crate::error::ManualError;
use crate::localized::LanguagePolicy;

fn manual() -> Manual {
    Manual::from_json(include_str!("../../assets/manual.json")).unwrap()
}

#[test]
fn test_node_key_text_form() {
    let chapter = NodeKey::chapter("ch-01");
    let group = NodeKey::group("ch-01", "grp-setup");

    assert_eq!(chapter.to_string(), "chapter:ch-01");
    assert_eq!(group.to_string(), "group:ch-01/grp-setup");
    assert_eq!(NodeKey::parse("group:ch-01/grp-setup"), Some(group));
    assert_eq!(NodeKey::parse("chapter:ch-01"), Some(chapter));
    assert_eq!(NodeKey::parse("section:x"), None);
}

#[test]
fn test_select_section_is_idempotent() {
    let manual = manual();
    let target = manual.find_section_by_id("sec-02").unwrap();

    let mut once = NavState::new("zh");
    once.select_section(target);
    let mut twice = once.clone();
    twice.select_section(target);

    assert_eq!(once, twice);
    assert_eq!(once.current_section_id(), Some("sec-02"));
    assert!(once.is_expanded(&NodeKey::chapter("ch-01")));
    assert!(once.is_expanded(&NodeKey::group("ch-01", "grp-setup")));
    assert!(once.selection_is_visible(&manual));
}

#[test]
fn test_selection_never_collapses() {
    let manual = manual();
    let mut nav = NavState::new("zh");
    nav.select_section(manual.find_section_by_id("sec-01").unwrap());
    nav.select_section(manual.find_section_by_id("sec-03").unwrap());

    assert!(nav.is_expanded(&NodeKey::chapter("ch-01")));
    assert!(nav.is_expanded(&NodeKey::chapter("ch-02")));
    assert!(nav.is_expanded(&NodeKey::group("ch-02", "ch-02-grp-default")));
    assert_eq!(nav.expanded().len(), 4);
}

#[test]
fn test_toggle_flips_membership() {
    let mut nav = NavState::new("en");

    assert!(nav.toggle_chapter("ch-01"));
    assert!(nav.is_expanded(&NodeKey::chapter("ch-01")));
    assert!(!nav.toggle_chapter("ch-01"));
    assert!(nav.expanded().is_empty());

    assert!(nav.toggle_group("ch-01", "grp-setup"));
    assert!(!nav.is_expanded(&NodeKey::group("ch-02", "grp-setup")));
}

#[test]
fn test_set_language_keeps_position() {
    let manual = manual();
    let policy = LanguagePolicy::default();
    let mut nav = NavState::startup(&manual, Some("#sec-02"), "zh").unwrap();
    let expanded = nav.expanded().clone();

    nav.set_language("en", &policy).unwrap();

    assert_eq!(nav.language(), "en");
    assert_eq!(nav.current_section_id(), Some("sec-02"));
    assert_eq!(nav.expanded(), &expanded);

    let err = nav.set_language("fr", &policy).unwrap_err();
    assert!(matches!(err, ManualError::UnsupportedLanguage(_)));
    assert_eq!(nav.language(), "en", "Rejected codes leave the language alone");
}

#[test]
fn test_startup_prefers_deep_link() {
    let manual = manual();

    let linked = NavState::startup(&manual, Some("ch-02/sec-03"), "zh").unwrap();
    assert_eq!(linked.current_section_id(), Some("sec-03"));

    let unknown = NavState::startup(&manual, Some("#sec-99"), "zh").unwrap();
    assert_eq!(unknown.current_section_id(), Some("sec-01"));

    let none = NavState::startup(&manual, None, "zh").unwrap();
    assert_eq!(none.current_section_id(), Some("sec-01"));
    assert_eq!(none.fragment().as_deref(), Some("#sec-01"));
}

#[test]
fn test_startup_on_empty_manual() {
    let manual = Manual::from_json(r#"{"chapters": [{"id": "c1", "sections": []}]}"#).unwrap();

    let err = NavState::startup(&manual, None, "zh").unwrap_err();
    assert!(matches!(err, ManualError::StructurallyIncomplete));
}

#[test]
fn test_navigate_hash_unknown_is_noop() {
    let manual = manual();
    let mut nav = NavState::startup(&manual, None, "zh").unwrap();
    let before = nav.clone();

    let err = nav.navigate_hash(&manual, "#ghost").unwrap_err();

    assert!(matches!(err, ManualError::SectionNotFound(_)));
    assert_eq!(nav, before);

    nav.navigate_hash(&manual, "#ch-01/sec-02").unwrap();
    assert_eq!(nav.current_section_id(), Some("sec-02"));
}
