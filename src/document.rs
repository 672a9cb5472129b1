//! The manual tree: chapters, groups, sections and their content blocks.
//!
//! Manuals come in two shapes. Newer documents nest sections inside groups within each chapter,
//! older ones list sections directly under the chapter. Both are normalised at load time into the
//! three-level form so that everything downstream only ever sees chapters → groups → sections.
//!
//! The tree is built once and never mutated. Navigation state and the search index refer back into
//! it by section id, which is why ids are checked for uniqueness before a manual is handed out.

use crate::error::{ManualError, Result};
use crate::localized::Localized;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Suffix appended to a chapter id to name its synthetic group.
pub const DEFAULT_GROUP_SUFFIX: &str = "-grp-default";

const ANONYMOUS_CHAPTER_ID: &str = "ch";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Product information shown in the viewer header.
pub struct Meta {
    #[serde(default, deserialize_with = "null_as_default")]
    /// Product name.
    pub product: String,
    #[serde(default, deserialize_with = "null_as_default")]
    /// Manual or product version string.
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Root of a loaded manual.
pub struct Manual {
    #[serde(default)]
    /// Header information; absent in some hand-written documents.
    pub meta: Option<Meta>,
    #[serde(default, deserialize_with = "null_as_default")]
    /// Chapters in reading order.
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// A chapter as written in the document, before group normalisation.
pub struct RawChapter {
    #[serde(default, deserialize_with = "null_as_default")]
    /// Chapter id; may be missing in legacy documents.
    pub id: String,
    #[serde(default)]
    /// Chapter heading per language.
    pub title: Localized<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Three-level form: groups of sections.
    pub groups: Option<Vec<Group>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Two-level form: sections directly under the chapter.
    pub sections: Option<Vec<Section>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawChapter")]
/// A chapter in normalised three-level form.
pub struct Chapter {
    /// Chapter id.
    pub id: String,
    /// Chapter heading per language.
    pub title: Localized<String>,
    /// Groups in reading order; legacy chapters hold exactly one synthetic group.
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// A named cluster of sections within a chapter.
pub struct Group {
    #[serde(default, deserialize_with = "null_as_default")]
    /// Group id, unique within its chapter.
    pub id: String,
    #[serde(default)]
    /// Group heading per language.
    pub title: Localized<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    /// Sections in reading order.
    pub sections: Vec<Section>,
    #[serde(skip)]
    /// Set on the group wrapped around a legacy chapter's sections.
    pub synthetic: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// The addressable unit of content.
pub struct Section {
    #[serde(default, deserialize_with = "null_as_default")]
    /// Section id, unique across the whole manual.
    pub id: String,
    #[serde(default)]
    /// Section heading per language.
    pub title: Localized<String>,
    #[serde(default, deserialize_with = "lenient_blocks")]
    /// Content blocks in display order; untyped or malformed blocks become [`Block::Unsupported`].
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// One renderable item of section content.
pub enum Block {
    /// Paragraph text; translations sit directly on the block (`{"type":"text","en":…}`).
    Text(Localized<String>),
    /// An illustration with an optional caption.
    Image {
        #[serde(default, deserialize_with = "null_as_default")]
        /// Image location relative to the document.
        src: String,
        #[serde(default = "default_image_size", deserialize_with = "image_size")]
        /// Display size tag such as `sm`, `md` or `lg`.
        size: String,
        #[serde(default)]
        /// Caption per language.
        caption: Localized<String>,
    },
    /// A table with one header row.
    Table {
        #[serde(default, deserialize_with = "header_cells")]
        /// Header cells per language.
        headers: Localized<Vec<String>>,
        #[serde(default, deserialize_with = "body_rows")]
        /// Body rows per language, each an ordered list of cells.
        rows: Localized<Vec<Vec<String>>>,
    },
    #[serde(other)]
    /// A block type this viewer does not know how to show.
    Unsupported,
}

fn default_image_size() -> String {
    "md".to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn image_size<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_image_size))
}

fn lenient_blocks<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<Block>, D::Error> {
    let values: Vec<serde_json::Value> = null_as_default(deserializer)?;
    Ok(values
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::debug!("skipping block: {e}");
                Block::Unsupported
            })
        })
        .collect())
}

fn cell_row(cells: Option<Vec<Option<String>>>) -> Vec<String> {
    cells
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect()
}

fn header_cells<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Localized<Vec<String>>, D::Error> {
    let headers = Localized::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(headers.map(|cells| cell_row(Some(cells))))
}

fn body_rows<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Localized<Vec<Vec<String>>>, D::Error> {
    let rows = Localized::<Vec<Option<Vec<Option<String>>>>>::deserialize(deserializer)?;
    Ok(rows.map(|rows| rows.into_iter().map(cell_row).collect()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A section together with the chapter and group that own it.
pub struct SectionRef<'a> {
    /// Owning chapter.
    pub chapter: &'a Chapter,
    /// Owning group.
    pub group: &'a Group,
    /// The section itself.
    pub section: &'a Section,
}

impl Chapter {
    #[must_use]
    /// Converts a chapter as written into three-level form.
    ///
    /// A chapter that already lists groups is passed through; otherwise its sections are wrapped
    /// in a single group named `<chapterId>-grp-default`. Missing arrays count as empty.
    pub fn normalize(raw: RawChapter) -> Self {
        let groups = match (raw.groups, raw.sections) {
            (Some(groups), _) => groups,
            (None, Some(sections)) => vec![Group {
                id: default_group_id(&raw.id),
                title: default_group_title(),
                sections,
                synthetic: true,
            }],
            (None, None) => Vec::new(),
        };

        Self {
            id: raw.id,
            title: raw.title,
            groups,
        }
    }
}

impl From<RawChapter> for Chapter {
    fn from(raw: RawChapter) -> Self {
        Self::normalize(raw)
    }
}

impl From<Chapter> for RawChapter {
    fn from(chapter: Chapter) -> Self {
        Self {
            id: chapter.id,
            title: chapter.title,
            groups: Some(chapter.groups),
            sections: None,
        }
    }
}

#[must_use]
/// Id given to the synthetic group of a legacy chapter.
pub fn default_group_id(chapter_id: &str) -> String {
    let chapter_id = if chapter_id.is_empty() {
        ANONYMOUS_CHAPTER_ID
    } else {
        chapter_id
    };
    format!("{chapter_id}{DEFAULT_GROUP_SUFFIX}")
}

#[must_use]
/// Placeholder heading of a synthetic group.
pub fn default_group_title() -> Localized<String> {
    [("zh", "未分類".to_string()), ("en", "General".to_string())]
        .into_iter()
        .collect()
}

#[must_use]
/// Extracts the section id named by a URI fragment.
///
/// Accepts `#sec`, `sec`, `#chapter/sec` and `chapter/sec`. The chapter part is informational
/// only and never takes part in lookup. Returns `None` for an empty fragment.
pub fn deep_link_section_id(hash: &str) -> Option<&str> {
    let fragment = hash.trim();
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment).trim();
    if fragment.is_empty() {
        return None;
    }

    let parts: Vec<&str> = fragment.split('/').collect();
    let id = if parts.len() == 2 { parts[1] } else { parts[0] };
    Some(id)
}

#[must_use]
/// Fragment written back to the location bar when a section is shown.
pub fn fragment_for(section_id: &str) -> String {
    format!("#{section_id}")
}

impl Manual {
    /// Parses a manual from JSON text and checks its integrity.
    ///
    /// # Errors
    ///
    /// Returns [`ManualError::DocumentParse`] for malformed JSON and
    /// [`ManualError::DuplicateSectionId`] when section ids collide.
    pub fn from_json(json: &str) -> Result<Self> {
        let manual: Self = serde_json::from_str(json)?;
        manual.validate()?;
        Ok(manual)
    }

    /// Reads and parses a manual from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ManualError::DocumentLoad`] if the file cannot be read, otherwise whatever
    /// [`Manual::from_json`] reports.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| ManualError::DocumentLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let manual = Self::from_json(&json)?;
        tracing::info!(
            "loaded manual from {} ({} chapters, {} sections)",
            path.display(),
            manual.chapters.len(),
            manual.sections().count()
        );
        Ok(manual)
    }

    /// Checks that no two sections share an id.
    ///
    /// Sections without an id cannot be deep-linked and are not considered.
    ///
    /// # Errors
    ///
    /// Returns [`ManualError::DuplicateSectionId`] naming the first repeated id.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for found in self.sections() {
            let id = found.section.id.as_str();
            if !id.is_empty() && !seen.insert(id) {
                return Err(ManualError::DuplicateSectionId { id: id.to_string() });
            }
        }
        Ok(())
    }

    /// Every section in reading order with its owners.
    pub fn sections(&self) -> impl Iterator<Item = SectionRef<'_>> {
        self.chapters.iter().flat_map(|chapter| {
            chapter.groups.iter().flat_map(move |group| {
                group.sections.iter().map(move |section| SectionRef {
                    chapter,
                    group,
                    section,
                })
            })
        })
    }

    #[must_use]
    /// Finds a section by id anywhere in the manual; the first match in reading order wins.
    pub fn find_section_by_id(&self, id: &str) -> Option<SectionRef<'_>> {
        if id.is_empty() {
            return None;
        }
        self.sections().find(|found| found.section.id == id)
    }

    #[must_use]
    /// Resolves a URI fragment to a section, looking it up by section id alone.
    pub fn resolve_deep_link(&self, hash: &str) -> Option<SectionRef<'_>> {
        let id = deep_link_section_id(hash)?;
        let found = self.find_section_by_id(id);
        if found.is_none() {
            tracing::warn!("deep link {hash:?} names no section");
        }
        found
    }

    #[must_use]
    /// The first section of the first group of the first chapter, if there is one.
    pub fn first_section(&self) -> Option<SectionRef<'_>> {
        let chapter = self.chapters.first()?;
        let group = chapter.groups.first()?;
        let section = group.sections.first()?;
        Some(SectionRef {
            chapter,
            group,
            section,
        })
    }
}

#[cfg(test)]
#[path = "tests/document.rs"]
mod tests;
