use super::help::centered_rect;
use crate::app::JumpSelector;
use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

/// Jump-to-episode popup over the episode screen.
pub fn render(jump: &JumpSelector, frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let items: Vec<ListItem> = jump
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let style = if entry.value.is_none() {
                Style::default().fg(Color::DarkGray)
            } else if i == jump.chosen {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(entry.label.as_str()).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Jump to episode ")
                .title_bottom(Line::from(" Enter select · Esc close ").style(Style::default().fg(Color::DarkGray))),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = ListState::default();
    state.select(Some(jump.cursor));
    frame.render_stateful_widget(list, area, &mut state);
}
