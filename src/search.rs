//! Free-text search over the active language, and query highlighting for display.
//!
//! The index holds one lower-cased haystack per section. It is tied to a single language and is
//! always rebuilt from scratch when the language changes; patching it in place would let entries
//! from the previous language survive into results.

use crate::document::{Block, Manual};
use regex::{Captures, Regex, RegexBuilder};
use serde::Serialize;

/// Opening highlight marker inserted around query matches.
pub const MARK_OPEN: &str = "<mark>";
/// Closing highlight marker.
pub const MARK_CLOSE: &str = "</mark>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Searchable text of one section, with ids pointing back into the manual.
pub struct SearchRecord {
    /// Owning chapter id.
    pub chapter_id: String,
    /// Owning group id.
    pub group_id: String,
    /// Section id.
    pub section_id: String,
    /// Lower-cased titles and body text in the index language.
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// All search records for one language, in reading order.
pub struct SearchIndex {
    language: String,
    records: Vec<SearchRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What a query asks the caller to show.
pub enum SearchOutcome<'a> {
    /// Blank query: show the table of contents, not a result list.
    Unfiltered,
    /// Matching records in reading order; may be empty.
    Matches(Vec<&'a SearchRecord>),
}

impl SearchIndex {
    #[must_use]
    /// Indexes every section of `manual` in `language`.
    ///
    /// Each record concatenates the chapter, group and section titles, every text block, and
    /// every table header and cell, each followed by a space.
    pub fn build(manual: &Manual, language: &str) -> Self {
        let records: Vec<SearchRecord> = manual
            .sections()
            .map(|found| {
                let mut text = String::new();
                push_term(&mut text, found.chapter.title.text(language));
                push_term(&mut text, found.group.title.text(language));
                push_term(&mut text, found.section.title.text(language));

                for block in &found.section.blocks {
                    match block {
                        Block::Text(body) => push_term(&mut text, body.text(language)),
                        Block::Table { headers, rows } => {
                            for header in headers.items(language) {
                                push_term(&mut text, header);
                            }
                            for cell in rows.items(language).iter().flatten() {
                                push_term(&mut text, cell);
                            }
                        }
                        Block::Image { .. } | Block::Unsupported => {}
                    }
                }

                SearchRecord {
                    chapter_id: found.chapter.id.clone(),
                    group_id: found.group.id.clone(),
                    section_id: found.section.id.clone(),
                    text: text.to_lowercase(),
                }
            })
            .collect();

        tracing::debug!("built {language} search index: {} records", records.len());

        Self {
            language: language.to_string(),
            records,
        }
    }

    #[must_use]
    /// Language the records were built in.
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    /// All records in reading order.
    pub fn records(&self) -> &[SearchRecord] {
        &self.records
    }

    #[must_use]
    /// Case-insensitive substring search; blank queries yield [`SearchOutcome::Unfiltered`].
    pub fn query(&self, query: &str) -> SearchOutcome<'_> {
        let needle = normalize_query(query);
        if needle.is_empty() {
            return SearchOutcome::Unfiltered;
        }
        SearchOutcome::Matches(
            self.records
                .iter()
                .filter(|record| record.text.contains(&needle))
                .collect(),
        )
    }
}

fn push_term(text: &mut String, term: &str) {
    text.push_str(term);
    text.push(' ');
}

#[must_use]
/// Trims and lower-cases a query the way records are stored.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

#[must_use]
/// Escapes text for safe embedding in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[derive(Debug, Clone)]
/// Marks query occurrences in text, compiled once per query.
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    #[must_use]
    /// Prepares a case-insensitive literal matcher; a blank query marks nothing.
    pub fn new(query: &str) -> Self {
        let query = query.trim();
        if query.is_empty() {
            return Self { pattern: None };
        }

        let pattern = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build();
        match pattern {
            Ok(pattern) => Self {
                pattern: Some(pattern),
            },
            Err(e) => {
                tracing::warn!("cannot highlight {query:?}: {e}");
                Self { pattern: None }
            }
        }
    }

    #[must_use]
    /// Escapes `raw` and wraps every match in the escaped text in [`MARK_OPEN`]/[`MARK_CLOSE`].
    ///
    /// The query is matched literally against the escaped form, so a query containing `<` or `&`
    /// only matches where the escaped text spells it out.
    pub fn apply(&self, raw: &str) -> String {
        let safe = escape_html(raw);
        let Some(pattern) = &self.pattern else {
            return safe;
        };

        pattern
            .replace_all(&safe, |caps: &Captures<'_>| {
                format!("{MARK_OPEN}{}{MARK_CLOSE}", &caps[0])
            })
            .into_owned()
    }
}

#[must_use]
/// Escapes `raw` and highlights every case-insensitive occurrence of `query`.
pub fn highlight(raw: &str, query: &str) -> String {
    Highlighter::new(query).apply(raw)
}

#[cfg(test)]
#[path = "tests/search.rs"]
mod tests;
