use super::cards::{episode_card, episode_count_label};
use super::{card_width, render_header, render_search, render_status};
use crate::app::{App, EpisodeView};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

pub fn render(app: &App, view: &EpisodeView, frame: &mut Frame) {
    let area = frame.area();

    // Layout: header(2) + search(3) + count(1) + cards(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(app, format!("[show #{}]", view.show_id), frame, chunks[0]);
    render_search(app, "Search episodes", frame, chunks[1]);

    // ── Count + current jump choice ──
    let jump_label = view
        .jump
        .entries
        .get(view.jump.chosen)
        .map(|e| e.label.as_str())
        .unwrap_or_default();
    let count = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {}", episode_count_label(view.displayed.len())),
            Style::default().fg(Color::Green),
        ),
        Span::styled("   Jump (e): ", Style::default().fg(Color::DarkGray)),
        Span::styled(jump_label, Style::default().fg(Color::White)),
    ]));
    frame.render_widget(count, chunks[2]);

    // ── Cards ──
    let width = card_width(chunks[3]);
    let items: Vec<ListItem> = view
        .displayed_episodes()
        .map(|ep| ListItem::new(episode_card(ep, width)))
        .collect();

    let list_widget = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Episodes ")
                .title_bottom(
                    Line::from(format!(" {} total ", view.episodes.len())).alignment(Alignment::Right),
                ),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▸ ");

    let mut list_state = ListState::default();
    if !view.displayed.is_empty() {
        list_state.select(Some(view.selected));
    }
    frame.render_stateful_widget(list_widget, chunks[3], &mut list_state);

    render_status(
        app,
        &[
            (" ↑↓", " Navigate  "),
            ("/", " Search  "),
            ("e", " Jump  "),
            ("Esc", " Back  "),
            ("?", " Help  "),
        ],
        frame,
        chunks[4],
    );
}
