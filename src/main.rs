//! lectern: a bilingual manual viewer for the terminal.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use lectern::app_state::{self, AppState, CommandOutcome, Mode};
use lectern::{config, document, ui};
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

const SCROLL_STEP: u16 = 10;

#[derive(Parser)]
#[command(name = "lectern")]
#[command(about = "Bilingual manual viewer with a navigable table of contents and search", long_about = None)]
struct Args {
    /// Manual document to open (defaults to the configured document)
    #[arg(value_name = "PATH")]
    document: Option<PathBuf>,

    /// Display language
    #[arg(long, short = 'l')]
    lang: Option<String>,

    /// Deep link to open, e.g. `sec-02` or `ch-01/sec-02`
    #[arg(long)]
    hash: Option<String>,

    /// Initial search query
    #[arg(long, short = 'q')]
    query: Option<String>,

    /// Print the render plan as JSON instead of starting the viewer
    #[arg(long)]
    dump: bool,

    /// Configuration file (defaults to lectern.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log state transitions as well
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    init_logging(args.log_file.as_deref(), args.verbose)?;

    let cfg = args
        .config
        .as_deref()
        .map_or_else(config::Config::load, config::Config::load_from);

    let path = args
        .document
        .unwrap_or_else(|| PathBuf::from(&cfg.document));
    let manual = document::Manual::load(&path)?;

    let mut state = AppState::new(
        manual,
        cfg.language_policy(),
        &cfg.breadcrumb_separator,
        args.hash.as_deref(),
        args.lang.as_deref(),
    )?;

    if let Some(query) = args.query {
        state.search_input.clone_from(&query);
        state.dispatch(app_state::Command::SetQuery(query))?;
    }

    if args.dump {
        let json = serde_json::to_string_pretty(&state.plan)?;
        println!("{json}");
        return Ok(());
    }

    run_tui(state)?;
    Ok(())
}

fn init_logging(path: Option<&Path>, verbose: bool) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(level)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run_tui(mut app: AppState) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.mode {
            Mode::Browse => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Up | KeyCode::Char('k') => app.cursor_up(),
                KeyCode::Down | KeyCode::Char('j') => app.cursor_down(),
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Right => app.activate_cursor(),
                KeyCode::Tab => app.cycle_language(),
                KeyCode::Char('/') => app.start_search(),
                KeyCode::Char(':') => {
                    app.mode = Mode::Command;
                    app.command_buffer.clear();
                    app.message = None;
                }
                KeyCode::PageDown => {
                    app.content_scroll = app.content_scroll.saturating_add(SCROLL_STEP);
                }
                KeyCode::PageUp => {
                    app.content_scroll = app.content_scroll.saturating_sub(SCROLL_STEP);
                }
                KeyCode::Esc => {
                    if !app.query().is_empty() {
                        app.clear_search();
                    }
                }
                _ => {}
            },
            Mode::Search => match key.code {
                KeyCode::Char(c) => app.push_search_char(c),
                KeyCode::Backspace => app.pop_search_char(),
                KeyCode::Up => app.cursor_up(),
                KeyCode::Down => app.cursor_down(),
                KeyCode::Enter => app.mode = Mode::Browse,
                KeyCode::Esc => app.clear_search(),
                _ => {}
            },
            Mode::Command => match key.code {
                KeyCode::Char(c) => {
                    app.command_buffer.push(c);
                }
                KeyCode::Backspace => {
                    app.command_buffer.pop();
                }
                KeyCode::Enter => {
                    let cmd = app.command_buffer.clone();
                    app.mode = Mode::Browse; // Always return to browsing
                    app.command_buffer.clear();
                    if app.run_command(&cmd) == CommandOutcome::Quit {
                        return Ok(());
                    }
                }
                KeyCode::Esc => {
                    app.mode = Mode::Browse;
                    app.command_buffer.clear();
                }
                _ => {}
            },
        }
    }
}
