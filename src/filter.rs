//! In-memory search over fetched collections.
//!
//! Every filter returns indices into the input slice, in input order, and
//! never touches the collection itself. Matching is a case-insensitive
//! substring test OR-ed across the searched fields; an empty query keeps
//! everything.

use crate::catalog::{Episode, EpisodeId, Show};
use crate::text::strip_html;

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

pub fn show_matches(show: &Show, needle: &str) -> bool {
    contains(&show.name, needle)
        || show
            .summary
            .as_deref()
            .is_some_and(|s| contains(&strip_html(s), needle))
        || contains(&show.genres.join(" "), needle)
}

pub fn episode_matches(episode: &Episode, needle: &str) -> bool {
    contains(&episode.name, needle)
        || episode
            .summary
            .as_deref()
            .is_some_and(|s| contains(&strip_html(s), needle))
}

pub fn filter_shows(shows: &[Show], query: &str) -> Vec<usize> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return (0..shows.len()).collect();
    }
    shows
        .iter()
        .enumerate()
        .filter(|(_, s)| show_matches(s, &needle))
        .map(|(i, _)| i)
        .collect()
}

pub fn filter_episodes(episodes: &[Episode], query: &str) -> Vec<usize> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return (0..episodes.len()).collect();
    }
    episodes
        .iter()
        .enumerate()
        .filter(|(_, e)| episode_matches(e, &needle))
        .map(|(i, _)| i)
        .collect()
}

/// Jump-selector lookup: the single episode with `id`, or all of them when
/// the placeholder (`None`) is chosen.
pub fn select_episode(episodes: &[Episode], id: Option<EpisodeId>) -> Vec<usize> {
    match id {
        None => (0..episodes.len()).collect(),
        Some(id) => episodes.iter().position(|e| e.id == id).into_iter().collect(),
    }
}
