//! Error types for loading and navigating a manual.
//!
//! Only the load boundary and explicit command validation can fail. Lookups over a loaded manual
//! are total, and a missing translation is never an error.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ManualError>;

#[derive(Debug, Error)]
/// Everything that can go wrong between reading a manual and painting it.
pub enum ManualError {
    /// The document could not be read from disk.
    #[error("failed to load {}: {source}", path.display())]
    DocumentLoad {
        /// Location the document was read from.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The document was read but is not a valid manual.
    #[error("failed to parse manual: {0}")]
    DocumentParse(#[from] serde_json::Error),

    /// The manual has no chapter, group or section to show.
    #[error("manual structure is incomplete: no chapters/groups/sections to show")]
    StructurallyIncomplete,

    /// Two sections claim the same id, so deep links would be ambiguous.
    #[error("duplicate section id: {id}")]
    DuplicateSectionId {
        /// The id that occurs more than once.
        id: String,
    },

    /// A deep link or stored reference names no section.
    #[error("section not found: {0}")]
    SectionNotFound(String),

    /// The requested display language is not in the supported set.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
}

impl ManualError {
    #[must_use]
    /// Whether this error prevents the viewer from rendering anything at all.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DocumentLoad { .. }
                | Self::DocumentParse(_)
                | Self::StructurallyIncomplete
                | Self::DuplicateSectionId { .. }
        )
    }
}
