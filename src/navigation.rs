//! Where the reader is: display language, shown section, and which tree nodes are open.
//!
//! Expansion only grows through selection. Selecting a section opens its chapter and group but
//! never closes anything else the reader left open; only an explicit toggle collapses a node.

use crate::document::{self, Manual, SectionRef};
use crate::error::{ManualError, Result};
use crate::localized::LanguagePolicy;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Identifies an expandable node of the table of contents.
///
/// Displays as `chapter:<id>` or `group:<chapterId>/<groupId>`; group keys carry the chapter id
/// because group ids are only unique within their chapter.
pub enum NodeKey {
    /// A chapter node.
    Chapter(String),
    /// A group node inside a chapter.
    Group {
        /// Owning chapter id.
        chapter: String,
        /// Group id.
        group: String,
    },
}

impl NodeKey {
    #[must_use]
    /// Key of a chapter node.
    pub fn chapter(id: &str) -> Self {
        Self::Chapter(id.to_string())
    }

    #[must_use]
    /// Key of a group node.
    pub fn group(chapter_id: &str, group_id: &str) -> Self {
        Self::Group {
            chapter: chapter_id.to_string(),
            group: group_id.to_string(),
        }
    }

    #[must_use]
    /// Parses the textual form produced by `Display`.
    pub fn parse(key: &str) -> Option<Self> {
        if let Some(id) = key.strip_prefix("chapter:") {
            return Some(Self::chapter(id));
        }
        let rest = key.strip_prefix("group:")?;
        let (chapter, group) = rest.split_once('/')?;
        Some(Self::group(chapter, group))
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chapter(id) => write!(f, "chapter:{id}"),
            Self::Group { chapter, group } => write!(f, "group:{chapter}/{group}"),
        }
    }
}

impl Serialize for NodeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Reader position, owned by the application shell and changed only through its methods.
pub struct NavState {
    language: String,
    current_section_id: Option<String>,
    expanded: BTreeSet<NodeKey>,
}

impl NavState {
    #[must_use]
    /// Fresh state with nothing selected and everything collapsed.
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            current_section_id: None,
            expanded: BTreeSet::new(),
        }
    }

    /// Resolves the section to show when the viewer opens.
    ///
    /// A deep link that names a known section wins; otherwise the first section of the first
    /// group of the first chapter is shown.
    ///
    /// # Errors
    ///
    /// Returns [`ManualError::StructurallyIncomplete`] when there is no section to fall back to.
    pub fn startup(manual: &Manual, hash: Option<&str>, language: &str) -> Result<Self> {
        let mut state = Self::new(language);

        let target = hash
            .and_then(|h| manual.resolve_deep_link(h))
            .or_else(|| manual.first_section())
            .ok_or(ManualError::StructurallyIncomplete)?;

        state.select_section(target);
        Ok(state)
    }

    #[must_use]
    /// Active display language.
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    /// Id of the section being shown, if any.
    pub fn current_section_id(&self) -> Option<&str> {
        self.current_section_id.as_deref()
    }

    #[must_use]
    /// The section being shown, looked up in `manual`.
    pub fn current_section<'a>(&self, manual: &'a Manual) -> Option<SectionRef<'a>> {
        self.current_section_id
            .as_deref()
            .and_then(|id| manual.find_section_by_id(id))
    }

    #[must_use]
    /// Keys of every open node.
    pub fn expanded(&self) -> &BTreeSet<NodeKey> {
        &self.expanded
    }

    #[must_use]
    /// Whether the node is open.
    pub fn is_expanded(&self, key: &NodeKey) -> bool {
        self.expanded.contains(key)
    }

    /// Shows a section and opens the path leading to it. Applying it twice changes nothing.
    pub fn select_section(&mut self, found: SectionRef<'_>) {
        self.expanded.insert(NodeKey::chapter(&found.chapter.id));
        self.expanded
            .insert(NodeKey::group(&found.chapter.id, &found.group.id));
        self.current_section_id = Some(found.section.id.clone());
        tracing::debug!("selected section {}", found.section.id);
    }

    /// Follows a URI fragment to its section.
    ///
    /// # Errors
    ///
    /// Returns [`ManualError::SectionNotFound`] and leaves the state untouched when the fragment
    /// names no section.
    pub fn navigate_hash(&mut self, manual: &Manual, hash: &str) -> Result<()> {
        let found = manual
            .resolve_deep_link(hash)
            .ok_or_else(|| ManualError::SectionNotFound(hash.to_string()))?;
        self.select_section(found);
        Ok(())
    }

    /// Opens a closed node or closes an open one; returns whether it is now open.
    pub fn toggle(&mut self, key: NodeKey) -> bool {
        if self.expanded.remove(&key) {
            tracing::debug!("collapsed {key}");
            false
        } else {
            tracing::debug!("expanded {key}");
            self.expanded.insert(key);
            true
        }
    }

    /// Toggles a chapter node.
    pub fn toggle_chapter(&mut self, chapter_id: &str) -> bool {
        self.toggle(NodeKey::chapter(chapter_id))
    }

    /// Toggles a group node.
    pub fn toggle_group(&mut self, chapter_id: &str, group_id: &str) -> bool {
        self.toggle(NodeKey::group(chapter_id, group_id))
    }

    /// Switches the display language. Selection and expansion are kept as they are.
    ///
    /// Anything derived from the language, such as the search index, must be rebuilt by the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns [`ManualError::UnsupportedLanguage`] if `policy` rejects the code.
    pub fn set_language(&mut self, code: &str, policy: &LanguagePolicy) -> Result<()> {
        let language = policy.resolve(code)?;
        tracing::debug!("language {} -> {language}", self.language);
        self.language = language.to_string();
        Ok(())
    }

    #[must_use]
    /// Fragment for the shown section, for a replace-style location update.
    pub fn fragment(&self) -> Option<String> {
        self.current_section_id
            .as_deref()
            .map(document::fragment_for)
    }

    #[must_use]
    /// Whether the chapter and group of the shown section are both open.
    pub fn selection_is_visible(&self, manual: &Manual) -> bool {
        self.current_section(manual).is_none_or(|found| {
            self.is_expanded(&NodeKey::chapter(&found.chapter.id))
                && self.is_expanded(&NodeKey::group(&found.chapter.id, &found.group.id))
        })
    }
}

#[cfg(test)]
#[path = "tests/navigation.rs"]
mod tests;
