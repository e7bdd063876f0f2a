mod app;

use std::fs::{self, OpenOptions};
use std::io::{Stdout, stdout};
use std::{env, path::PathBuf, process};

use anyhow::Result;
use app::{App, Focus};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use inkpost_config::Config;
use inkpost_engine::{EditorOptions, io};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(config: Option<&Config>) -> Result<()> {
    let log_path = match config {
        Some(config) => config.log_path(),
        None => env::temp_dir().join("inkpost.log"),
    };
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;
    let level = config.map(|c| c.log_level.as_str()).unwrap_or("info");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    log::info!("logging to {}", log_path.display());
    Ok(())
}

fn editor_options(config: Option<&Config>) -> EditorOptions {
    match config {
        Some(config) => EditorOptions {
            placeholder: config.placeholder.clone(),
            font_families: config.font_families.clone(),
            font_sizes: config.font_sizes.clone(),
            history_depth: config.history_depth,
        },
        None => EditorOptions::default(),
    }
}

fn main() -> Result<()> {
    // Determine drafts path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let (drafts_path, from_config) = match (args.len(), &config) {
        (2, _) => (PathBuf::from(&args[1]), false),
        (1, Some(config)) => (config.drafts_path.clone(), true),
        (1, None) => {
            eprintln!("Error: No drafts path provided and no config file found");
            eprintln!("Usage: {} <drafts-folder-path>", args[0]);
            eprintln!("Or create a config file at {}", config_path.display());
            process::exit(1);
        }
        _ => {
            eprintln!("Usage: {} [drafts-folder-path]", args[0]);
            process::exit(1);
        }
    };

    if let Err(e) = io::validate_drafts_dir(&drafts_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Drafts path '{}'{} is invalid: {e}",
            drafts_path.display(),
            source
        );
        process::exit(1);
    }

    init_logging(config.as_ref())?;
    let mut app = App::new(drafts_path, editor_options(config.as_ref()))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("{err:?}");
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(outer[0]);

    render_drafts(f, app, chunks[0]);
    render_editor(f, app, chunks[1]);
    render_status(f, app, outer[1]);

    if app.active_modal.is_some() {
        render_modal(f, app);
    }
}

fn focused_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn render_drafts(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .drafts
        .iter()
        .map(|path| {
            let marker = if app.current.as_ref() == Some(path) && app.is_dirty() {
                "* "
            } else {
                "  "
            };
            ListItem::new(Line::from(vec![Span::raw(format!("{marker}{path}"))]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Drafts")
                .border_style(focused_border(app.focus == Focus::Drafts)),
        )
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(list, area, &mut app.draft_list_state);
}

fn render_editor(f: &mut Frame, app: &App, area: Rect) {
    let (title, body) = match app.editor.raw_session() {
        Some(session) => {
            let text = session.text();
            let cursor = app.raw_cursor.min(text.len());
            (
                "HTML",
                vec![Line::from(vec![
                    Span::raw(text[..cursor].to_string()),
                    Span::styled("|", Style::default().fg(Color::Yellow)),
                    Span::raw(text[cursor..].to_string()),
                ])],
            )
        }
        None => {
            let markup = app.editor.markup();
            let lines = match app.editor.placeholder() {
                Some(placeholder) if app.current.is_some() => vec![Line::from(Span::styled(
                    placeholder.to_string(),
                    Style::default().fg(Color::DarkGray),
                ))],
                _ => markup
                    .split_inclusive('>')
                    .map(|chunk| Line::from(chunk.to_string()))
                    .collect(),
            };
            ("Document", lines)
        }
    };

    let content = Paragraph::new(body)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(focused_border(app.focus == Focus::Editor)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(content, area);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let state = app.editor.toolbar_state();
    let flag = |on: bool, label: &'static str| {
        if on {
            Span::styled(label, Style::default().add_modifier(Modifier::REVERSED))
        } else {
            Span::raw(label)
        }
    };
    let block = state
        .block_format
        .map(|b| b.tag())
        .unwrap_or_else(|| "-".to_string());
    let toolbar = Line::from(vec![
        flag(state.bold, " B "),
        flag(state.italic, " I "),
        flag(state.underline, " U "),
        flag(state.strikethrough, " S "),
        flag(state.superscript, " ^ "),
        flag(state.subscript, " _ "),
        Span::raw(format!(
            " | {block} | {:?} | {:?} | {} {} ",
            state.alignment,
            state.list,
            state.font_family.as_deref().unwrap_or("-"),
            state.font_size.as_deref().unwrap_or("-"),
        )),
        Span::raw(match state.table {
            Some(t) => format!("| table r{} c{} ", t.row_index + 1, t.column_index + 1),
            None => String::new(),
        }),
        Span::raw(format!("| sel {:?}", app.selection_text())),
    ]);

    let help = match &app.message {
        Some(message) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(
            "b/i/u/s ^ _: format | p 1-6 `: block | l c r J: align | L N O: lists | \
             Tab: indent | >: quote | k v m t: insert | [ ] x w T: table | \
             z/y: undo | e: html | ^S: save",
        ),
    };

    f.render_widget(Paragraph::new(vec![toolbar, help]), area);
}

fn render_modal(f: &mut Frame, app: &App) {
    let Some(kind) = app.active_modal else {
        return;
    };
    let area = centered(f.area(), 60, 12);
    let mut lines: Vec<Line> = app
        .modal_fields()
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let style = if i == app.field {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            if label.is_empty() {
                Line::from(Span::raw(value))
            } else {
                Line::from(vec![
                    Span::styled(format!("{label}: "), style),
                    Span::raw(value),
                ])
            }
        })
        .collect();
    if let Some(error) = app.modal_error() {
        lines.push(Line::from(Span::styled(error, Style::default().fg(Color::Red))));
    }
    lines.push(Line::from("Enter: ok | Esc: cancel | Tab: next field | Up/Down: choose"));

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(kind.title())),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
