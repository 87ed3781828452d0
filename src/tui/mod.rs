mod app;
mod ui;

use crate::query::Router;
use anyhow::Result;
use app::App;
use crossterm::{
    clipboard::CopyToClipboard,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::Duration;

pub fn run(router: Router, initial_query: Option<String>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(router.silent(true));
    if let Some(query) = initial_query {
        app.set_query(&query);
    }

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.refresh();
        terminal.draw(|f| ui::draw(f, app))?;

        // Placeholder is on screen; now block on the build
        if app.is_building() {
            app.run_pending();
            continue;
        }

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }

        // Only handle key press events, not release or repeat
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c' | 'q')) => return Ok(()),
            _ => {}
        }

        if app.mode == app::Mode::Help {
            app.hide_help();
            continue;
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('j' | 'n')) => app.select_next(),
            (KeyModifiers::CONTROL, KeyCode::Char('k' | 'p')) => app.select_prev(),
            (KeyModifiers::CONTROL, KeyCode::Char('w')) => app.delete_word(),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => app.clear_query(),
            (KeyModifiers::CONTROL, KeyCode::Char('h')) => app.pop_char(),
            (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
                if let Some(url) = app.selected_url() {
                    execute!(terminal.backend_mut(), CopyToClipboard::to_clipboard_from(url.as_bytes()))?;
                    app.status_message = format!("Copied {url}");
                }
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => match code {
                KeyCode::Esc => {
                    if app.query.is_empty() {
                        return Ok(());
                    }
                    app.clear_query();
                }
                KeyCode::Enter => app.primary_action(),
                KeyCode::Tab => app.autocomplete(),
                KeyCode::Down => app.select_next(),
                KeyCode::Up => app.select_prev(),
                KeyCode::Home => app.select_first(),
                KeyCode::End => app.select_last(),
                KeyCode::F(1) => app.show_help(),
                KeyCode::Backspace => app.pop_char(),
                KeyCode::Char(c) => app.push_char(c),
                _ => {}
            },
            _ => {}
        }
    }
}
