//! Pure projections from manual and reader state to render plans.
//!
//! Nothing here paints. Plans are plain data a renderer walks to build its own widgets (the
//! terminal UI in [`crate::ui`], or anything that reads the JSON form), and every activatable
//! element carries the [`Command`] it should dispatch.

use crate::app_state::Command;
use crate::document::{Block, Manual, Section};
use crate::navigation::{NavState, NodeKey};
use crate::search::{Highlighter, SearchRecord};
use serde::Serialize;

/// Header label used when the manual carries no meta information.
pub const MISSING_META_LABEL: &str = "Meta information missing (check the manual document)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Accordion table of contents.
pub struct TocPlan {
    /// Chapters in reading order.
    pub chapters: Vec<TocChapter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A chapter node of the table of contents.
pub struct TocChapter {
    /// Expansion key of this node.
    pub key: NodeKey,
    /// Heading in the active language.
    pub label: String,
    /// Whether the chapter is open.
    pub is_expanded: bool,
    /// Command that toggles this chapter.
    pub on_activate: Command,
    /// Groups in reading order.
    pub groups: Vec<TocGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A group node of the table of contents.
pub struct TocGroup {
    /// Expansion key of this node.
    pub key: NodeKey,
    /// Heading in the active language.
    pub label: String,
    /// Whether the group is open.
    pub is_expanded: bool,
    /// Whether the group was synthesised for a chapter without groups.
    pub synthetic: bool,
    /// Command that toggles this group.
    pub on_activate: Command,
    /// Section entries in reading order.
    pub sections: Vec<TocSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A section entry of the table of contents.
pub struct TocSection {
    /// Section id.
    pub section_id: String,
    /// Heading in the active language.
    pub label: String,
    /// Whether this is the section being shown.
    pub is_active: bool,
    /// Command that shows this section.
    pub on_activate: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
/// What a flattened table of contents row stands for.
pub enum RowKind {
    /// Chapter heading.
    Chapter {
        /// Whether the chapter is open.
        expanded: bool,
    },
    /// Group heading.
    Group {
        /// Whether the group is open.
        expanded: bool,
        /// Whether the group is synthetic.
        synthetic: bool,
    },
    /// Section entry.
    Section {
        /// Whether the section is being shown.
        active: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One visible line of the table of contents, for list-based renderers.
pub struct TocRow {
    /// Nesting depth: 0 for chapters, 1 for groups, 2 for sections.
    pub depth: usize,
    /// Text to show.
    pub label: String,
    /// Node type and state.
    pub kind: RowKind,
    /// Command to dispatch when the row is activated.
    pub on_activate: Command,
}

impl TocPlan {
    #[must_use]
    /// Rows a reader can currently see: children of closed nodes are left out.
    pub fn visible_rows(&self) -> Vec<TocRow> {
        let mut rows = Vec::new();
        for chapter in &self.chapters {
            rows.push(TocRow {
                depth: 0,
                label: chapter.label.clone(),
                kind: RowKind::Chapter {
                    expanded: chapter.is_expanded,
                },
                on_activate: chapter.on_activate.clone(),
            });
            if !chapter.is_expanded {
                continue;
            }

            for group in &chapter.groups {
                rows.push(TocRow {
                    depth: 1,
                    label: group.label.clone(),
                    kind: RowKind::Group {
                        expanded: group.is_expanded,
                        synthetic: group.synthetic,
                    },
                    on_activate: group.on_activate.clone(),
                });
                if !group.is_expanded {
                    continue;
                }

                rows.extend(group.sections.iter().map(|section| TocRow {
                    depth: 2,
                    label: section.label.clone(),
                    kind: RowKind::Section {
                        active: section.is_active,
                    },
                    on_activate: section.on_activate.clone(),
                }));
            }
        }
        rows
    }

    #[must_use]
    /// Position of the active section among the visible rows.
    pub fn active_row(&self) -> Option<usize> {
        self.visible_rows()
            .iter()
            .position(|row| matches!(row.kind, RowKind::Section { active: true }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Body of the section being shown.
pub struct ContentPlan {
    /// Section id.
    pub section_id: String,
    /// Plain (unescaped) heading in the active language.
    pub title: String,
    /// Block instructions in display order.
    pub blocks: Vec<BlockPlan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// Render instruction for one content block.
pub enum BlockPlan {
    /// Escaped paragraph text with highlight markers.
    Text {
        /// HTML-safe markup.
        markup: String,
    },
    /// Image with plain caption text.
    Image {
        /// Image location.
        src: String,
        /// Size tag.
        size: String,
        /// Caption in the active language.
        caption: String,
    },
    /// Table whose header and cell values are escaped and highlighted.
    Table {
        /// Header cells as markup.
        headers: Vec<String>,
        /// Body rows as markup.
        rows: Vec<Vec<String>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Search results shown in place of the table of contents.
pub struct ResultPlan {
    /// Entries in reading order; empty means "no matches".
    pub entries: Vec<ResultEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One search hit.
pub struct ResultEntry {
    /// `chapter / group / section` titles in the active language.
    pub breadcrumb: String,
    /// Section id of the hit.
    pub section_id: String,
    /// Command that shows the hit.
    pub on_activate: Command,
}

#[must_use]
/// Header text: `"<product> / <version>"`, or [`MISSING_META_LABEL`].
pub fn project_meta(manual: &Manual) -> String {
    manual.meta.as_ref().map_or_else(
        || MISSING_META_LABEL.to_string(),
        |meta| format!("{} / {}", meta.product, meta.version),
    )
}

#[must_use]
/// Builds the accordion for the reader's language, expansion and selection.
pub fn project_toc(manual: &Manual, nav: &NavState) -> TocPlan {
    let lang = nav.language();
    let current = nav.current_section_id();

    let chapters = manual
        .chapters
        .iter()
        .map(|chapter| {
            let key = NodeKey::chapter(&chapter.id);
            let groups = chapter
                .groups
                .iter()
                .map(|group| {
                    let key = NodeKey::group(&chapter.id, &group.id);
                    TocGroup {
                        is_expanded: nav.is_expanded(&key),
                        label: group.title.text(lang).to_string(),
                        synthetic: group.synthetic,
                        on_activate: Command::ToggleNode(key.clone()),
                        key,
                        sections: group
                            .sections
                            .iter()
                            .map(|section| TocSection {
                                section_id: section.id.clone(),
                                label: section.title.text(lang).to_string(),
                                is_active: current.is_some_and(|id| id == section.id),
                                on_activate: Command::SelectSection(section.id.clone()),
                            })
                            .collect(),
                    }
                })
                .collect();

            TocChapter {
                is_expanded: nav.is_expanded(&key),
                label: chapter.title.text(lang).to_string(),
                on_activate: Command::ToggleNode(key.clone()),
                key,
                groups,
            }
        })
        .collect();

    TocPlan { chapters }
}

#[must_use]
/// Builds the block instructions of a section, highlighting `query` in text and table values.
pub fn project_section(section: &Section, language: &str, query: &str) -> ContentPlan {
    let highlighter = Highlighter::new(query);

    let blocks = section
        .blocks
        .iter()
        .filter_map(|block| match block {
            Block::Text(body) => Some(BlockPlan::Text {
                markup: highlighter.apply(body.text(language)),
            }),
            Block::Image { src, size, caption } => Some(BlockPlan::Image {
                src: src.clone(),
                size: size.clone(),
                caption: caption.text(language).to_string(),
            }),
            Block::Table { headers, rows } => Some(BlockPlan::Table {
                headers: headers
                    .items(language)
                    .iter()
                    .map(|h| highlighter.apply(h))
                    .collect(),
                rows: rows
                    .items(language)
                    .iter()
                    .map(|row| row.iter().map(|cell| highlighter.apply(cell)).collect())
                    .collect(),
            }),
            Block::Unsupported => None,
        })
        .collect();

    ContentPlan {
        section_id: section.id.clone(),
        title: section.title.text(language).to_string(),
        blocks,
    }
}

#[must_use]
/// Builds breadcrumb entries for search hits, titles joined by `separator`.
pub fn project_search_results(
    manual: &Manual,
    matches: &[&SearchRecord],
    language: &str,
    separator: &str,
) -> ResultPlan {
    let entries = matches
        .iter()
        .filter_map(|record| manual.find_section_by_id(&record.section_id))
        .map(|found| {
            let breadcrumb = [
                found.chapter.title.text(language),
                found.group.title.text(language),
                found.section.title.text(language),
            ]
            .join(separator);
            ResultEntry {
                breadcrumb,
                section_id: found.section.id.clone(),
                on_activate: Command::SelectSection(found.section.id.clone()),
            }
        })
        .collect();

    ResultPlan { entries }
}

#[cfg(test)]
#[path = "tests/view.rs"]
mod tests;
