use super::cards::show_card;
use super::{card_width, render_header, render_search, render_status};
use crate::app::App;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState},
};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Layout: header(2) + search(3) + cards(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    let total = app.shows.as_ref().map_or(0, |s| s.len());
    render_header(app, format!("[{} of {} shows]", app.visible_shows.len(), total), frame, chunks[0]);
    render_search(app, "Search shows", frame, chunks[1]);

    // ── Cards ──
    let width = card_width(chunks[2]);
    let items: Vec<ListItem> = match &app.shows {
        Some(shows) => app
            .visible_shows
            .iter()
            .map(|&i| ListItem::new(show_card(&shows[i], width)))
            .collect(),
        None => Vec::new(),
    };

    let position = format!(
        " {} / {} ",
        if app.visible_shows.is_empty() { 0 } else { app.show_selected + 1 },
        app.visible_shows.len()
    );

    let list_widget = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Shows ")
                .title_bottom(Line::from(position).alignment(Alignment::Right)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▸ ");

    let mut list_state = ListState::default();
    if !app.visible_shows.is_empty() {
        list_state.select(Some(app.show_selected));
    }
    frame.render_stateful_widget(list_widget, chunks[2], &mut list_state);

    render_status(
        app,
        &[
            (" ↑↓", " Navigate  "),
            ("/", " Search  "),
            ("Enter", " Episodes  "),
            ("?", " Help  "),
            ("q", " Quit  "),
        ],
        frame,
        chunks[3],
    );
}
