//! The application shell: single owner of the manual, reader state and search index.
//!
//! Every user action becomes one of a small closed set of [`Command`]s. Dispatching a command
//! updates state synchronously and returns a fresh [`RenderPlan`], so a renderer never observes a
//! half-applied change. The shell also keeps the interactive front end's cursor, input mode and
//! buffers, which are pure UI bookkeeping and never feed back into the core.

use crate::document::{fragment_for, Manual};
use crate::error::{ManualError, Result};
use crate::localized::LanguagePolicy;
use crate::navigation::{NavState, NodeKey};
use crate::search::{normalize_query, SearchIndex, SearchOutcome};
use crate::view::{self, ContentPlan, ResultPlan, TocPlan};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "target", rename_all = "snake_case")]
/// Inputs the core understands.
pub enum Command {
    /// Show the section with this id and open the path to it.
    SelectSection(String),
    /// Open or close a chapter or group.
    ToggleNode(NodeKey),
    /// Switch the display language.
    SetLanguage(String),
    /// Replace the search query; a blank query clears it.
    SetQuery(String),
    /// Follow a URI fragment such as `#sec-01` or `#ch-01/sec-01`.
    NavigateHash(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "plan", rename_all = "snake_case")]
/// What the sidebar shows.
pub enum Sidebar {
    /// The accordion table of contents.
    Toc(TocPlan),
    /// Search hits for a non-blank query.
    Results(ResultPlan),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Everything a renderer needs to paint one frame.
pub struct RenderPlan {
    /// Header label.
    pub meta: String,
    /// Active language code.
    pub language: String,
    /// Current query, trimmed and lower-cased; empty when not searching.
    pub query: String,
    /// Sidebar contents.
    pub sidebar: Sidebar,
    /// Body of the shown section.
    pub content: Option<ContentPlan>,
    /// Fragment to write into the location without adding a history entry.
    pub replace_fragment: Option<String>,
    /// Ask the renderer to bring the first highlight into view once painted.
    pub scroll_to_highlight: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Determines how keystrokes are interpreted by the interactive front end.
pub enum Mode {
    /// Moving through the sidebar and reading.
    Browse,
    /// Typing a search query.
    Search,
    /// Typing a `:` command.
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Result of running a typed `:` command.
pub enum CommandOutcome {
    /// Keep running.
    Continue,
    /// Leave the viewer.
    Quit,
}

/// Owns the loaded manual and all state derived from it.
pub struct AppState {
    manual: Manual,
    policy: LanguagePolicy,
    separator: String,
    nav: NavState,
    index: SearchIndex,
    query: String,
    showing_results: bool,
    /// The most recent render plan.
    pub plan: RenderPlan,
    /// Active input mode.
    pub mode: Mode,
    /// Highlighted row in the sidebar.
    pub cursor: usize,
    /// Text typed into the search prompt.
    pub search_input: String,
    /// Accumulates `:` command input.
    pub command_buffer: String,
    /// Status feedback displayed in the help bar.
    pub message: Option<String>,
    /// First visible line of the content pane.
    pub content_scroll: u16,
}

impl AppState {
    /// Opens a manual at the deep-linked section, or at its first section.
    ///
    /// # Errors
    ///
    /// Returns [`ManualError::UnsupportedLanguage`] if `language` is rejected by `policy`, and
    /// [`ManualError::StructurallyIncomplete`] if the manual has no section to show.
    pub fn new(
        manual: Manual,
        policy: LanguagePolicy,
        separator: &str,
        hash: Option<&str>,
        language: Option<&str>,
    ) -> Result<Self> {
        let language = policy
            .resolve(language.unwrap_or(policy.default_language()))?
            .to_string();
        let nav = NavState::startup(&manual, hash, &language)?;
        let index = SearchIndex::build(&manual, &language);

        let mut state = Self {
            manual,
            policy,
            separator: separator.to_string(),
            nav,
            index,
            query: String::new(),
            showing_results: false,
            plan: RenderPlan {
                meta: String::new(),
                language,
                query: String::new(),
                sidebar: Sidebar::Toc(TocPlan {
                    chapters: Vec::new(),
                }),
                content: None,
                replace_fragment: None,
                scroll_to_highlight: false,
            },
            mode: Mode::Browse,
            cursor: 0,
            search_input: String::new(),
            command_buffer: String::new(),
            message: None,
            content_scroll: 0,
        };
        state.plan = state.render(state.nav.fragment(), false);
        state.reset_cursor();
        Ok(state)
    }

    #[must_use]
    /// The loaded manual.
    pub fn manual(&self) -> &Manual {
        &self.manual
    }

    #[must_use]
    /// Reader position.
    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    #[must_use]
    /// Search index for the active language.
    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    #[must_use]
    /// Accepted languages.
    pub fn policy(&self) -> &LanguagePolicy {
        &self.policy
    }

    #[must_use]
    /// Current normalised query.
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    /// Runs the current query against the index.
    pub fn search(&self) -> SearchOutcome<'_> {
        self.index.query(&self.query)
    }

    /// Applies one command and returns the plan for the resulting state.
    ///
    /// # Errors
    ///
    /// Returns [`ManualError::SectionNotFound`] for an unknown section or fragment and
    /// [`ManualError::UnsupportedLanguage`] for a rejected language. State is unchanged on error.
    pub fn dispatch(&mut self, command: Command) -> Result<RenderPlan> {
        tracing::debug!("dispatch {command:?}");
        let mut fragment = None;
        let mut scroll_to_highlight = false;

        match command {
            Command::SelectSection(id) => {
                let found = self
                    .manual
                    .find_section_by_id(&id)
                    .ok_or_else(|| ManualError::SectionNotFound(id.clone()))?;
                self.nav.select_section(found);
                scroll_to_highlight = self.showing_results;
                self.showing_results = false;
                fragment = Some(fragment_for(&id));
            }
            Command::ToggleNode(key) => {
                self.nav.toggle(key);
            }
            Command::SetLanguage(code) => {
                self.nav.set_language(&code, &self.policy)?;
                self.index = SearchIndex::build(&self.manual, self.nav.language());
                self.showing_results = false;
            }
            Command::SetQuery(query) => {
                self.query = normalize_query(&query);
                self.showing_results = !self.query.is_empty();
            }
            Command::NavigateHash(hash) => {
                self.nav.navigate_hash(&self.manual, &hash)?;
                self.showing_results = false;
                fragment = self.nav.fragment();
            }
        }

        if fragment.is_some() {
            debug_assert!(self.nav.selection_is_visible(&self.manual));
        }
        self.plan = self.render(fragment, scroll_to_highlight);
        Ok(self.plan.clone())
    }

    #[must_use]
    /// Projects the current state into a render plan.
    pub fn render(&self, replace_fragment: Option<String>, scroll_to_highlight: bool) -> RenderPlan {
        let language = self.nav.language();

        let sidebar = match self.search() {
            SearchOutcome::Matches(matches) if self.showing_results => Sidebar::Results(
                view::project_search_results(&self.manual, &matches, language, &self.separator),
            ),
            _ => Sidebar::Toc(view::project_toc(&self.manual, &self.nav)),
        };

        let content = self
            .nav
            .current_section(&self.manual)
            .map(|found| view::project_section(found.section, language, &self.query));

        RenderPlan {
            meta: view::project_meta(&self.manual),
            language: language.to_string(),
            query: self.query.clone(),
            sidebar,
            content,
            replace_fragment,
            scroll_to_highlight,
        }
    }

    /// Dispatches a command from the interactive front end, reporting failures in the status bar.
    pub fn apply(&mut self, command: Command) {
        let moves_selection = matches!(
            command,
            Command::SelectSection(_) | Command::NavigateHash(_) | Command::SetLanguage(_)
        );
        match self.dispatch(command) {
            Ok(plan) => {
                self.message = None;
                if plan.content.is_some() && moves_selection {
                    self.content_scroll = 0;
                }
                if moves_selection || matches!(plan.sidebar, Sidebar::Results(_)) {
                    self.reset_cursor();
                }
                self.clamp_cursor();
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    #[must_use]
    /// Number of selectable rows in the sidebar.
    pub fn sidebar_len(&self) -> usize {
        match &self.plan.sidebar {
            Sidebar::Toc(toc) => toc.visible_rows().len(),
            Sidebar::Results(results) => results.entries.len(),
        }
    }

    #[must_use]
    /// Command bound to the sidebar row under the cursor.
    pub fn command_at_cursor(&self) -> Option<Command> {
        match &self.plan.sidebar {
            Sidebar::Toc(toc) => toc
                .visible_rows()
                .into_iter()
                .nth(self.cursor)
                .map(|row| row.on_activate),
            Sidebar::Results(results) => results
                .entries
                .get(self.cursor)
                .map(|entry| entry.on_activate.clone()),
        }
    }

    /// Activates the sidebar row under the cursor.
    pub fn activate_cursor(&mut self) {
        if let Some(command) = self.command_at_cursor() {
            self.apply(command);
        }
    }

    /// Moves the sidebar cursor up one row.
    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moves the sidebar cursor down one row.
    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.sidebar_len() {
            self.cursor += 1;
        }
    }

    /// Switches to the next supported language.
    pub fn cycle_language(&mut self) {
        let next = self.policy.next_after(self.nav.language()).to_string();
        self.apply(Command::SetLanguage(next));
    }

    /// Opens the search prompt, prefilled with the current query.
    pub fn start_search(&mut self) {
        self.search_input = self.query.clone();
        self.mode = Mode::Search;
        self.message = None;
    }

    /// Appends to the search prompt and refilters.
    pub fn push_search_char(&mut self, c: char) {
        self.search_input.push(c);
        self.apply(Command::SetQuery(self.search_input.clone()));
    }

    /// Removes the last character of the search prompt and refilters.
    pub fn pop_search_char(&mut self) {
        self.search_input.pop();
        self.apply(Command::SetQuery(self.search_input.clone()));
    }

    /// Clears the query and returns to browsing the table of contents.
    pub fn clear_search(&mut self) {
        self.search_input.clear();
        self.mode = Mode::Browse;
        self.apply(Command::SetQuery(String::new()));
    }

    /// Runs a typed `:` command such as `lang en`, `goto ch-01/sec-02`, `toggle chapter:ch-01`
    /// or `q`.
    pub fn run_command(&mut self, input: &str) -> CommandOutcome {
        let input = input.trim();
        let (name, arg) = input
            .split_once(char::is_whitespace)
            .map_or((input, ""), |(name, arg)| (name, arg.trim()));

        match (name, arg) {
            ("q" | "quit", _) => return CommandOutcome::Quit,
            ("lang", code) if !code.is_empty() => self.apply(Command::SetLanguage(code.to_string())),
            ("goto", hash) if !hash.is_empty() => self.apply(Command::NavigateHash(hash.to_string())),
            ("toggle", key) if !key.is_empty() => match NodeKey::parse(key) {
                Some(key) => self.apply(Command::ToggleNode(key)),
                None => self.message = Some(format!("Not a chapter or group: {key}")),
            },
            ("search", query) => {
                self.search_input = query.to_string();
                self.apply(Command::SetQuery(query.to_string()));
            }
            _ => self.message = Some(format!("Unknown command: {input}")),
        }
        CommandOutcome::Continue
    }

    fn reset_cursor(&mut self) {
        self.cursor = match &self.plan.sidebar {
            Sidebar::Toc(toc) => toc.active_row().unwrap_or(0),
            Sidebar::Results(_) => 0,
        };
    }

    fn clamp_cursor(&mut self) {
        let len = self.sidebar_len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }
}

#[cfg(test)]
#[path = "tests/app_state.rs"]
mod tests;
