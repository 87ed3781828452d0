use crate::item::ItemKind;
use crate::tui::app::{App, Mode};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

const HELP: &[(&str, &str)] = &[
    ("Enter", "open the selected page (datasets: start searching)"),
    ("Tab", "complete the input from the selected row"),
    ("Ctrl+A", "copy the selected URL"),
    ("Up/Down, Ctrl+J/K, Ctrl+N/P", "move the selection"),
    ("Ctrl+W", "delete word"),
    ("Ctrl+U", "clear the input"),
    ("Esc", "clear the input, quit when empty"),
    ("Ctrl+C, Ctrl+Q", "quit"),
    ("<dataset> <query>!~", "rebuild the dataset index, then search"),
];

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Query input
            Constraint::Min(5),    // Items
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_query_input(f, app, chunks[0]);
    draw_items(f, app, chunks[1]);
    draw_status_bar(f, app, chunks[2]);

    if app.mode == Mode::Help {
        draw_help(f, f.area());
    }
}

fn draw_query_input(f: &mut Frame, app: &App, area: Rect) {
    let input = Paragraph::new(app.query.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" findref (F1: help, Esc: quit) "),
        );

    f.render_widget(input, area);

    if app.mode == Mode::Search {
        let width = app.query.chars().count() as u16;
        f.set_cursor_position((area.x + 1 + width.min(area.width.saturating_sub(3)), area.y + 1));
    }
}

fn draw_items(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .items
        .iter()
        .map(|item| {
            let title_style = match item.kind {
                ItemKind::Dataset => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ItemKind::Reference => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ItemKind::Placeholder => Style::default().fg(Color::Yellow),
                ItemKind::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            };

            ListItem::new(vec![
                Line::from(Span::styled(item.title.clone(), title_style)),
                Line::from(Span::styled(
                    format!("  {}", item.subtitle),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Results ({}) ", app.items.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default().with_selected((!app.items.is_empty()).then_some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let style = if app.is_building() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Cyan)
    };
    f.render_widget(Paragraph::new(app.status_message.as_str()).style(style), area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(8).min(72);
    let height = (HELP.len() as u16 + 4).min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    let lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!("{keys:>28}  "), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ])
        })
        .collect();

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Keys (any key to close) "))
            .wrap(Wrap { trim: false }),
        popup,
    );
}
