//! Configuration to acknowledge reader preferences as well as set defaults.
//!
//! Specifically, we try to find a lectern.toml, and if present we load settings from there.
//! This provides the language set, the default document and the breadcrumb separator.

use crate::localized::LanguagePolicy;
use facet::Facet;
use std::fs;
use std::path::Path;

/// File looked up in the working directory when no path is given.
pub const CONFIG_FILE: &str = "lectern.toml";

#[derive(Facet, Clone, Debug, PartialEq)]
/// User preferences loaded from lectern.toml or falling back to defaults.
pub struct Config {
    #[facet(default = "zh".to_string())]
    /// Language shown at startup and used for unsupported requests when falling back.
    pub default_language: String,
    #[facet(default = vec!["zh".to_string(), "en".to_string()])]
    /// Language codes the reader may switch between.
    pub languages: Vec<String>,
    #[facet(default = false)]
    /// Replace unsupported language requests with the default instead of rejecting them.
    pub fallback_to_default: bool,
    #[facet(default = "assets/manual.json".to_string())]
    /// Manual document opened when none is given on the command line.
    pub document: String,
    #[facet(default = " / ".to_string())]
    /// Separator between chapter, group and section titles in search results.
    pub breadcrumb_separator: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_language: "zh".to_string(),
            languages: vec!["zh".to_string(), "en".to_string()],
            fallback_to_default: false,
            document: "assets/manual.json".to_string(),
            breadcrumb_separator: " / ".to_string(),
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from lectern.toml if present.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    #[must_use]
    /// Load configuration from `path`, using defaults if it is missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if let Ok(contents) = fs::read_to_string(path) {
            if let Ok(config) = facet_toml::from_str::<Self>(&contents) {
                return config;
            }
            tracing::warn!("ignoring unparseable config {}", path.display());
        }
        Self::default()
    }

    #[must_use]
    /// Language rules derived from these preferences.
    pub fn language_policy(&self) -> LanguagePolicy {
        LanguagePolicy::new(
            self.languages.clone(),
            &self.default_language,
            self.fallback_to_default,
        )
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
