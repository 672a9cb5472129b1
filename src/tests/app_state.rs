use super::{AppState, Command, CommandOutcome, Mode, Sidebar};
use crate::document::Manual;
use crate::error::ManualError;
use crate::localized::LanguagePolicy;
use crate::navigation::NodeKey;
use crate::search::SearchOutcome;

fn app(hash: Option<&str>, language: Option<&str>) -> AppState {
    let manual = Manual::from_json(include_str!("../../assets/manual.json")).unwrap();
    AppState::new(manual, LanguagePolicy::default(), " / ", hash, language).unwrap()
}

#[test]
fn test_startup_plan() {
    let app = app(None, None);

    assert_eq!(app.plan.language, "zh");
    assert_eq!(app.plan.replace_fragment.as_deref(), Some("#sec-01"));
    assert_eq!(app.plan.content.as_ref().unwrap().section_id, "sec-01");
    assert!(matches!(app.plan.sidebar, Sidebar::Toc(_)));
    assert_eq!(app.cursor, 2, "Cursor starts on the active section");
}

#[test]
fn test_startup_rejects_unsupported_language() {
    let manual = Manual::from_json(include_str!("../../assets/manual.json")).unwrap();
    let result = AppState::new(manual, LanguagePolicy::default(), " / ", None, Some("fr"));
    assert!(matches!(result, Err(ManualError::UnsupportedLanguage(_))));
}

#[test]
fn test_startup_reports_structural_incompleteness() {
    let manual = Manual::from_json(r#"{"chapters": []}"#).unwrap();
    let result = AppState::new(manual, LanguagePolicy::default(), " / ", None, None);
    assert!(matches!(result, Err(ManualError::StructurallyIncomplete)));
}

#[test]
fn test_select_writes_fragment() {
    let mut app = app(None, Some("en"));

    let plan = app
        .dispatch(Command::SelectSection("sec-03".to_string()))
        .unwrap();

    assert_eq!(plan.replace_fragment.as_deref(), Some("#sec-03"));
    assert_eq!(plan.content.unwrap().title, "Unit Does Not Start");
    assert!(app.nav().is_expanded(&NodeKey::chapter("ch-02")));
    assert!(app.nav().is_expanded(&NodeKey::chapter("ch-01")));
}

#[test]
fn test_unknown_section_leaves_state() {
    let mut app = app(None, None);
    let before = app.nav().clone();

    let err = app
        .dispatch(Command::SelectSection("ghost".to_string()))
        .unwrap_err();

    assert!(matches!(err, ManualError::SectionNotFound(_)));
    assert!(!err.is_fatal());
    assert_eq!(app.nav(), &before);
}

#[test]
fn test_navigate_hash_normalises_fragment() {
    let mut app = app(None, None);

    let plan = app
        .dispatch(Command::NavigateHash("#ch-01/sec-02".to_string()))
        .unwrap();

    assert_eq!(plan.replace_fragment.as_deref(), Some("#sec-02"));
    assert_eq!(app.nav().current_section_id(), Some("sec-02"));
}

#[test]
fn test_query_switches_sidebar() {
    let mut app = app(None, Some("en"));

    let plan = app.dispatch(Command::SetQuery("  Power ".to_string())).unwrap();
    assert_eq!(plan.query, "power");
    match &plan.sidebar {
        Sidebar::Results(results) => assert_eq!(results.entries.len(), 3),
        Sidebar::Toc(_) => panic!("expected results"),
    }

    let plan = app.dispatch(Command::SetQuery("zzz-no-match".to_string())).unwrap();
    assert!(matches!(&plan.sidebar, Sidebar::Results(r) if r.entries.is_empty()));

    let plan = app.dispatch(Command::SetQuery("   ".to_string())).unwrap();
    assert!(matches!(plan.sidebar, Sidebar::Toc(_)));
    assert_eq!(app.search(), SearchOutcome::Unfiltered);
}

#[test]
fn test_selecting_result_returns_to_toc_and_scrolls() {
    let mut app = app(None, Some("en"));
    app.dispatch(Command::SetQuery("led".to_string())).unwrap();

    let plan = app
        .dispatch(Command::SelectSection("sec-03".to_string()))
        .unwrap();

    assert!(matches!(plan.sidebar, Sidebar::Toc(_)));
    assert!(plan.scroll_to_highlight);
    assert_eq!(plan.query, "led", "The query keeps highlighting the content");
    let content = plan.content.unwrap();
    assert!(matches!(
        &content.blocks[0],
        crate::view::BlockPlan::Text { markup } if markup.contains("<mark>LED</mark>")
    ));

    let plan = app
        .dispatch(Command::SelectSection("sec-01".to_string()))
        .unwrap();
    assert!(!plan.scroll_to_highlight, "Only result activations scroll");
}

#[test]
fn test_language_switch_rebuilds_index() {
    let mut app = app(Some("sec-02"), Some("zh"));
    let zh_index = app.index().clone();
    let expanded = app.nav().expanded().clone();

    app.dispatch(Command::SetLanguage("en".to_string())).unwrap();
    assert_eq!(app.index().language(), "en");
    assert!(matches!(app.index().query("電壓"), SearchOutcome::Matches(m) if m.is_empty()));
    assert_eq!(app.plan.content.as_ref().unwrap().title, "Connecting Power");

    app.dispatch(Command::SetLanguage("zh".to_string())).unwrap();
    assert_eq!(app.index(), &zh_index);
    assert_eq!(app.nav().expanded(), &expanded);
    assert_eq!(app.nav().current_section_id(), Some("sec-02"));
}

#[test]
fn test_toggle_collapses_and_reopens() {
    let mut app = app(None, None);
    let key = NodeKey::chapter("ch-01");

    app.dispatch(Command::ToggleNode(key.clone())).unwrap();
    assert!(!app.nav().is_expanded(&key));

    app.dispatch(Command::ToggleNode(key.clone())).unwrap();
    assert!(app.nav().is_expanded(&key));
}

#[test]
fn test_cursor_activation() {
    let mut app = app(None, Some("en"));

    // Rows: Getting Started, Setup, Unboxing, Connecting Power, Troubleshooting
    app.cursor_down();
    assert_eq!(app.cursor, 3);
    app.activate_cursor();
    assert_eq!(app.nav().current_section_id(), Some("sec-02"));

    app.cursor_down();
    app.activate_cursor();
    assert!(app.nav().is_expanded(&NodeKey::chapter("ch-02")));
    assert_eq!(app.sidebar_len(), 6, "The synthetic group stays closed");
}

#[test]
fn test_interactive_search() {
    let mut app = app(None, Some("en"));
    app.start_search();
    assert_eq!(app.mode, Mode::Search);

    for c in "hz".chars() {
        app.push_search_char(c);
    }
    assert_eq!(app.sidebar_len(), 1);
    app.activate_cursor();
    assert_eq!(app.nav().current_section_id(), Some("sec-02"));

    app.clear_search();
    assert_eq!(app.mode, Mode::Browse);
    assert_eq!(app.query(), "");
}

#[test]
fn test_typed_commands() {
    let mut app = app(None, None);

    assert_eq!(app.run_command("lang en"), CommandOutcome::Continue);
    assert_eq!(app.nav().language(), "en");

    app.run_command("goto ch-02/sec-03");
    assert_eq!(app.nav().current_section_id(), Some("sec-03"));

    app.run_command("lang fr");
    assert_eq!(app.message.as_deref(), Some("unsupported language: fr"));

    app.run_command("frobnicate");
    assert_eq!(app.message.as_deref(), Some("Unknown command: frobnicate"));

    app.run_command("toggle chapter:ch-01");
    assert!(!app.nav().is_expanded(&NodeKey::chapter("ch-01")));
    app.run_command("toggle group:ch-02/ch-02-grp-default");
    assert!(!app.nav().is_expanded(&NodeKey::group("ch-02", "ch-02-grp-default")));

    app.run_command("toggle section:sec-01");
    assert_eq!(
        app.message.as_deref(),
        Some("Not a chapter or group: section:sec-01")
    );

    assert_eq!(app.run_command("q"), CommandOutcome::Quit);
}

#[test]
fn test_cycle_language() {
    let mut app = app(None, None);
    app.cycle_language();
    assert_eq!(app.plan.language, "en");
    app.cycle_language();
    assert_eq!(app.plan.language, "zh");
}
