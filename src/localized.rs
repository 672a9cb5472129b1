//! Values that vary by display language, and the set of languages a viewer accepts.
//!
//! A manual stores every human-readable string as a map from language code to value. Looking up a
//! language the author never translated yields an empty value rather than an error, so a partially
//! translated manual still renders.

use crate::error::{ManualError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
/// Mapping from language code to a translated value.
///
/// A `null` map or a `null` translation deserializes as if it were absent.
pub struct Localized<T>(BTreeMap<String, T>);

impl<T> Default for Localized<T> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<T> Localized<T> {
    #[must_use]
    /// Looks up the translation for `lang`, if the author provided one.
    pub fn get(&self, lang: &str) -> Option<&T> {
        self.0.get(lang)
    }

    #[must_use]
    /// Converts every translation, keeping the language codes.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Localized<U> {
        Localized(self.0.into_iter().map(|(lang, v)| (lang, f(v))).collect())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Localized<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = Option::<BTreeMap<String, Option<T>>>::deserialize(deserializer)?;
        Ok(entries
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(lang, value)| value.map(|v| (lang, v)))
            .collect())
    }
}

impl Localized<String> {
    #[must_use]
    /// Translated text, or `""` when the language is missing.
    pub fn text(&self, lang: &str) -> &str {
        self.get(lang).map_or("", String::as_str)
    }
}

impl<T> Localized<Vec<T>> {
    #[must_use]
    /// Translated sequence, or an empty slice when the language is missing.
    pub fn items(&self, lang: &str) -> &[T] {
        self.get(lang).map_or(&[], Vec::as_slice)
    }
}

impl<T, K: Into<String>> FromIterator<(K, T)> for Localized<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Which language codes the viewer accepts and what to do with the rest.
pub struct LanguagePolicy {
    supported: Vec<String>,
    default: String,
    fallback_to_default: bool,
}

impl Default for LanguagePolicy {
    fn default() -> Self {
        Self::new(vec!["zh".to_string(), "en".to_string()], "zh", false)
    }
}

impl LanguagePolicy {
    #[must_use]
    /// Builds a policy; the default language is always treated as supported.
    pub fn new(mut supported: Vec<String>, default: &str, fallback_to_default: bool) -> Self {
        if !supported.iter().any(|code| code == default) {
            supported.insert(0, default.to_string());
        }
        Self {
            supported,
            default: default.to_string(),
            fallback_to_default,
        }
    }

    #[must_use]
    /// Language used when nothing else is requested.
    pub fn default_language(&self) -> &str {
        &self.default
    }

    #[must_use]
    /// Accepted language codes in display order.
    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    /// Validates a requested language code.
    ///
    /// Unsupported codes are rejected unless the policy was configured to fall back to the
    /// default language.
    ///
    /// # Errors
    ///
    /// Returns [`ManualError::UnsupportedLanguage`] for an unknown code without fallback.
    pub fn resolve(&self, code: &str) -> Result<&str> {
        let code = code.trim();
        if let Some(found) = self.supported.iter().find(|s| *s == code) {
            Ok(found)
        } else if self.fallback_to_default {
            tracing::warn!("unsupported language {code:?}, using {:?}", self.default);
            Ok(&self.default)
        } else {
            Err(ManualError::UnsupportedLanguage(code.to_string()))
        }
    }

    #[must_use]
    /// The supported language after `code`, wrapping around; used by language toggles.
    pub fn next_after(&self, code: &str) -> &str {
        let pos = self.supported.iter().position(|s| s == code);
        let next = pos.map_or(0, |i| (i + 1) % self.supported.len());
        &self.supported[next]
    }
}

#[cfg(test)]
#[path = "tests/localized.rs"]
mod tests;
