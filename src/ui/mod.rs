pub mod cards;
mod episodes;
mod help;
mod jump;
mod shows;

use crate::app::{App, InputMode, Screen};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

/// Top-level render dispatch.
pub fn render(app: &App, frame: &mut Frame) {
    match &app.screen {
        Screen::ShowsList => shows::render(app, frame),
        Screen::EpisodeList(view) => {
            episodes::render(app, view, frame);
            if view.jump.open {
                jump::render(&view.jump, frame);
            }
        }
    }

    // Render help overlay on top if active
    if app.show_help {
        help::render(frame);
    }
}

fn render_header(app: &App, extra: String, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(
            format!(" {}", app.heading()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("   {}", extra), Style::default().fg(Color::DarkGray)),
    ];
    if app.loading {
        spans.push(Span::styled("   loading…", Style::default().fg(Color::Yellow)));
    }
    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(header, area);
}

fn render_search(app: &App, title: &str, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let label = if editing {
        " Search (Enter/Esc to finish): "
    } else {
        " Search (/): "
    };
    let bar = Paragraph::new(format!("{}{}", label, app.query()))
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(format!(" {} ", title)),
        );
    frame.render_widget(bar, area);

    if editing {
        let cursor_x = search_cursor_x(area, label, app.query());
        frame.set_cursor_position((cursor_x, area.y.saturating_add(1)));
    }
}

/// Column of the text cursor in the search bar, kept inside the border.
fn search_cursor_x(area: Rect, label: &str, query: &str) -> u16 {
    let typed = u16::try_from(label.width() + query.width()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(typed)
        .min(area.right().saturating_sub(2))
}

fn hint(key: &'static str, action: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(
            key,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(action),
    ]
}

fn render_status(app: &App, hints: &[(&'static str, &'static str)], frame: &mut Frame, area: Rect) {
    let mut spans: Vec<Span> = hints.iter().flat_map(|&(k, a)| hint(k, a)).collect();
    spans.push(Span::styled(
        app.status_msg.as_str(),
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Usable text width inside a bordered list with a highlight symbol.
fn card_width(area: Rect) -> usize {
    area.width.saturating_sub(4) as usize
}
