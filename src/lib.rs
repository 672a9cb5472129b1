//! lectern: a bilingual manual viewer.
//!
//! A manual is a tree of chapters, groups and sections loaded once from a JSON document. The
//! library keeps the reader's position, searches the active language and turns both into render
//! plans; painting those plans is left to a front end such as the bundled terminal UI.
#![allow(clippy::multiple_crate_versions)]

pub mod app_state;
pub mod config;
pub mod document;
pub mod error;
pub mod localized;
pub mod navigation;
pub mod search;
pub mod ui;
pub mod view;

pub use error::{ManualError, Result};
