//! Pure builders for show and episode cards and the jump-selector entries.
//!
//! Nothing here reads application state: the same record always produces
//! the same card.

use crate::catalog::{Episode, EpisodeId, Show};
use crate::text::{strip_html, truncate_str};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
};

pub const JUMP_PLACEHOLDER: &str = "Jump to an episode...";

/// `S01E02 - Name`. Specials without an episode number print as `E00`.
pub fn episode_label(episode: &Episode) -> String {
    format!(
        "S{:02}E{:02} - {}",
        episode.season,
        episode.number.unwrap_or(0),
        episode.name
    )
}

pub fn episode_count_label(count: usize) -> String {
    format!("Showing {} episodes", count)
}

pub fn rating_label(show: &Show) -> String {
    match show.rating.average {
        Some(avg) => avg.to_string(),
        None => "N/A".to_string(),
    }
}

pub fn runtime_label(runtime: Option<u32>) -> String {
    match runtime {
        Some(mins) => format!("{} mins", mins),
        None => "N/A".to_string(),
    }
}

/// One option of the jump-selector. `value` is `None` for the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpEntry {
    pub value: Option<EpisodeId>,
    pub label: String,
}

/// Rebuild the jump-selector: the placeholder, then one entry per episode.
pub fn populate_episode_select(episodes: &[Episode]) -> Vec<JumpEntry> {
    std::iter::once(JumpEntry {
        value: None,
        label: JUMP_PLACEHOLDER.to_string(),
    })
    .chain(episodes.iter().map(|e| JumpEntry {
        value: Some(e.id),
        label: episode_label(e),
    }))
    .collect()
}

fn field(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn summary_line(summary: Option<&str>, width: usize) -> Line<'static> {
    let plain = summary.map(strip_html).unwrap_or_default();
    Line::from(Span::raw(truncate_str(&plain, width)))
}

fn image_line(url: Option<&str>, width: usize) -> Line<'static> {
    field(
        "  Image: ",
        truncate_str(url.unwrap_or(""), width.saturating_sub(9)),
    )
}

/// Card for one show. `width` is the usable text width.
pub fn show_card(show: &Show, width: usize) -> Text<'static> {
    let mut title = vec![Span::styled(
        truncate_str(&show.name, width),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    let extra: Vec<String> = show
        .premiered
        .map(|d| d.format("%Y").to_string())
        .into_iter()
        .chain(show.language.clone())
        .collect();
    if !extra.is_empty() {
        title.push(Span::styled(
            format!("  ({})", extra.join(", ")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Text::from(vec![
        Line::from(title),
        image_line(show.image_url(), width),
        summary_line(show.summary.as_deref(), width),
        field("  Genres: ", show.genres.join(", ")),
        field("  Status: ", show.status.clone()),
        field("  Rating: ", rating_label(show)),
        field("  Runtime: ", runtime_label(show.runtime)),
        Line::from(""),
    ])
}

/// Card for one episode.
pub fn episode_card(episode: &Episode, width: usize) -> Text<'static> {
    let mut title = vec![Span::styled(
        truncate_str(&episode_label(episode), width),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(date) = episode.airdate {
        title.push(Span::styled(
            format!("  {}", date.format("%Y-%m-%d")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(mins) = episode.runtime {
        title.push(Span::styled(
            format!("  {} mins", mins),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Text::from(vec![
        Line::from(title),
        image_line(episode.image_url(), width),
        summary_line(episode.summary.as_deref(), width),
        Line::from(""),
    ])
}
