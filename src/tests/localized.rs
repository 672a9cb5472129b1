use super::{LanguagePolicy, Localized};
use crate::error::ManualError;

#[test]
fn test_missing_language_resolves_empty() {
    let title: Localized<String> = [("zh", "一".to_string())].into_iter().collect();
    assert_eq!(title.text("zh"), "一");
    assert_eq!(title.text("en"), "");

    let headers: Localized<Vec<String>> = Localized::default();
    assert!(headers.items("en").is_empty());
}

#[test]
fn test_policy_rejects_unsupported_code() {
    let policy = LanguagePolicy::default();

    assert_eq!(policy.resolve("en").unwrap(), "en");
    assert_eq!(policy.resolve(" zh ").unwrap(), "zh");
    assert!(matches!(
        policy.resolve("fr"),
        Err(ManualError::UnsupportedLanguage(code)) if code == "fr"
    ));
}

#[test]
fn test_policy_fallback_uses_default() {
    let policy = LanguagePolicy::new(vec!["en".to_string()], "zh", true);

    assert_eq!(policy.supported(), ["zh", "en"]);
    assert_eq!(policy.resolve("fr").unwrap(), "zh");
}

#[test]
fn test_next_language_wraps() {
    let policy = LanguagePolicy::default();
    assert_eq!(policy.next_after("zh"), "en");
    assert_eq!(policy.next_after("en"), "zh");
    assert_eq!(policy.next_after("fr"), "zh");
}

#[test]
fn test_null_translations_are_dropped() {
    let title: Localized<String> =
        serde_json::from_str(r#"{"zh": null, "en": "Setup"}"#).unwrap();
    assert_eq!(title.text("zh"), "");
    assert_eq!(title.get("zh"), None);
    assert_eq!(title.text("en"), "Setup");

    let absent: Localized<String> = serde_json::from_str("null").unwrap();
    assert_eq!(absent, Localized::default());
}

#[test]
fn test_map_keeps_languages() {
    let cells: Localized<Vec<Option<String>>> = [("en", vec![Some("A".to_string()), None])]
        .into_iter()
        .collect();

    let cells = cells.map(|row| row.into_iter().map(Option::unwrap_or_default).collect::<Vec<_>>());

    assert_eq!(cells.items("en"), ["A", ""]);
    assert!(cells.items("zh").is_empty());
}
