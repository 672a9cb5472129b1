//! The UI paints the latest render plan into the terminal.
//!
//! The sidebar shows the accordion table of contents or the search results; the content pane
//! shows the selected section with query matches highlighted. Everything drawn here comes from
//! [`RenderPlan`], the UI never consults the manual directly.

use crate::app_state::{AppState, Mode, RenderPlan, Sidebar};
use crate::search::{MARK_CLOSE, MARK_OPEN};
use crate::view::{BlockPlan, ContentPlan, RowKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const TABLE_SEPARATOR: &str = " │ ";

/// Renders the whole viewer for the current application state.
pub fn draw(f: &mut Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Sidebar + content
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    draw_header(f, &app.plan, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);

    draw_sidebar(f, app, body[0]);
    draw_content(f, app, body[1]);
    draw_help(f, app, chunks[2]);
}

fn draw_header(f: &mut Frame, plan: &RenderPlan, area: ratatui::layout::Rect) {
    let mut spans = vec![
        Span::styled(
            plan.meta.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  [{}]", plan.language)),
    ];
    if let Some(fragment) = &plan.replace_fragment {
        spans.push(Span::styled(
            format!("  {fragment}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_sidebar(f: &mut Frame, app: &AppState, area: ratatui::layout::Rect) {
    let (items, title): (Vec<ListItem>, String) = match &app.plan.sidebar {
        Sidebar::Toc(toc) => {
            let items = toc
                .visible_rows()
                .into_iter()
                .map(|row| {
                    let indent = "  ".repeat(row.depth);
                    let (marker, style) = match row.kind {
                        RowKind::Chapter { expanded } => (
                            if expanded { "▾ " } else { "▸ " },
                            Style::default()
                                .fg(Color::Cyan)
                                .add_modifier(Modifier::BOLD),
                        ),
                        RowKind::Group {
                            expanded,
                            synthetic,
                        } => (
                            if expanded { "▾ " } else { "▸ " },
                            if synthetic {
                                Style::default().fg(Color::DarkGray)
                            } else {
                                Style::default().fg(Color::Blue)
                            },
                        ),
                        RowKind::Section { active: true } => (
                            "● ",
                            Style::default()
                                .fg(Color::Green)
                                .add_modifier(Modifier::BOLD),
                        ),
                        RowKind::Section { active: false } => ("  ", Style::default()),
                    };
                    ListItem::new(Line::from(vec![
                        Span::raw(format!("{indent}{marker}")),
                        Span::styled(row.label, style),
                    ]))
                })
                .collect();
            (items, "Contents".to_string())
        }
        Sidebar::Results(results) => {
            let items = if results.entries.is_empty() {
                vec![ListItem::new("No matches").style(Style::default().fg(Color::DarkGray))]
            } else {
                results
                    .entries
                    .iter()
                    .map(|entry| ListItem::new(entry.breadcrumb.clone()))
                    .collect()
            };
            let title = format!("Results for \"{}\" ({})", app.plan.query, results.entries.len());
            (items, title)
        }
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if app.sidebar_len() > 0 {
        state.select(Some(app.cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_content(f: &mut Frame, app: &mut AppState, area: ratatui::layout::Rect) {
    let Some(content) = &app.plan.content else {
        let empty = Paragraph::new("No section selected")
            .block(Block::default().borders(Borders::ALL).title("Section"));
        f.render_widget(empty, area);
        return;
    };

    let title = content.title.clone();
    let lines = content_lines(content);

    // Deferred cue: bring the first highlight into view once the lines exist.
    if app.plan.scroll_to_highlight {
        if let Some(row) = first_highlight_row(&lines, area.width.saturating_sub(2)) {
            app.content_scroll = row;
        }
        app.plan.scroll_to_highlight = false;
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.content_scroll, 0));
    f.render_widget(paragraph, area);
}

fn draw_help(f: &mut Frame, app: &AppState, area: ratatui::layout::Rect) {
    let (text, title) = match app.mode {
        Mode::Search => (format!("/{}", app.search_input), "Search"),
        Mode::Command => (format!(":{}", app.command_buffer), "Command"),
        Mode::Browse => (
            app.message.clone().unwrap_or_else(|| {
                "↑/↓: Navigate | Enter: Open | /: Search | Tab: Language | PgUp/PgDn: Scroll | :goto :lang | q: Quit"
                    .to_string()
            }),
            "",
        ),
    };

    let help = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(help, area);
}

/// Lays out a content plan as terminal lines.
#[must_use]
pub fn content_lines(content: &ContentPlan) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for block in &content.blocks {
        match block {
            BlockPlan::Text { markup } => {
                for paragraph in markup.split('\n') {
                    lines.push(Line::from(markup_spans(paragraph)));
                }
            }
            BlockPlan::Image { src, size, caption } => {
                lines.push(Line::from(Span::styled(
                    format!("[image {size}] {src}"),
                    Style::default().fg(Color::Magenta),
                )));
                if !caption.is_empty() {
                    lines.push(Line::from(Span::styled(
                        caption.clone(),
                        Style::default().add_modifier(Modifier::ITALIC),
                    )));
                }
            }
            BlockPlan::Table { headers, rows } => {
                if !headers.is_empty() {
                    let mut header = table_row(headers);
                    header.style = Style::default().add_modifier(Modifier::BOLD);
                    lines.push(header);
                    lines.push(Line::from("─".repeat(40)));
                }
                lines.extend(rows.iter().map(|row| table_row(row)));
            }
        }
        lines.push(Line::default());
    }

    lines
}

fn table_row(cells: &[String]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(
                TABLE_SEPARATOR,
                Style::default().fg(Color::DarkGray),
            ));
        }
        spans.extend(markup_spans(cell));
    }
    Line::from(spans)
}

fn highlight_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn line_has_highlight(line: &Line<'_>) -> bool {
    line.spans.iter().any(|span| span.style == highlight_style())
}

/// Screen row of the first highlighted line when wrapped to `width` columns.
fn first_highlight_row(lines: &[Line<'static>], width: u16) -> Option<u16> {
    let first = lines.iter().position(line_has_highlight)?;
    let above = Paragraph::new(lines[..first].to_vec()).wrap(Wrap { trim: false });
    Some(u16::try_from(above.line_count(width)).unwrap_or(u16::MAX))
}

/// Splits highlighted markup into styled spans, decoding HTML entities.
#[must_use]
pub fn markup_spans(markup: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut rest = markup;

    while let Some(open) = rest.find(MARK_OPEN) {
        if open > 0 {
            spans.push(Span::raw(unescape_html(&rest[..open])));
        }
        let after_open = &rest[open + MARK_OPEN.len()..];
        let close = after_open.find(MARK_CLOSE).unwrap_or(after_open.len());
        spans.push(Span::styled(
            unescape_html(&after_open[..close]),
            highlight_style(),
        ));
        rest = after_open
            .get(close + MARK_CLOSE.len()..)
            .unwrap_or_default();
    }
    if !rest.is_empty() {
        spans.push(Span::raw(unescape_html(rest)));
    }

    spans
}

/// Reverses the escaping applied by [`crate::search::escape_html`].
#[must_use]
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
#[path = "tests/ui.rs"]
mod tests;
