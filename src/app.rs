use crate::catalog::{CatalogError, Episode, Show, ShowId};
use crate::filter::{filter_episodes, filter_shows, select_episode};
use crate::ui::cards::{JumpEntry, populate_episode_select};
use std::sync::Arc;

pub const SHOWS_HEADING: &str = "TV Shows";

/// Counter bumped on every navigation. Episode responses carry the value
/// that was current when they were requested.
pub type RequestToken = u64;

/// Input mode for the search bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// State of the jump-to-episode popup.
#[derive(Debug, Clone)]
pub struct JumpSelector {
    pub entries: Vec<JumpEntry>,
    /// Index of the entry last chosen; 0 is the placeholder.
    pub chosen: usize,
    pub cursor: usize,
    pub open: bool,
}

impl JumpSelector {
    pub fn populate(episodes: &[Episode]) -> Self {
        Self {
            entries: populate_episode_select(episodes),
            chosen: 0,
            cursor: 0,
            open: false,
        }
    }
}

/// Everything the episode screen needs for one show.
#[derive(Debug, Clone)]
pub struct EpisodeView {
    pub show_id: ShowId,
    pub show_name: String,
    /// Full collection; the base for every local filter.
    pub episodes: Arc<Vec<Episode>>,
    /// Indices into `episodes` currently on screen.
    pub displayed: Vec<usize>,
    pub selected: usize,
    pub jump: JumpSelector,
}

impl EpisodeView {
    fn new(show_id: ShowId, show_name: String, episodes: Arc<Vec<Episode>>) -> Self {
        let jump = JumpSelector::populate(&episodes);
        let displayed = (0..episodes.len()).collect();
        Self {
            show_id,
            show_name,
            episodes,
            displayed,
            selected: 0,
            jump,
        }
    }

    pub fn displayed_episodes(&self) -> impl Iterator<Item = &Episode> {
        self.displayed.iter().map(|&i| &self.episodes[i])
    }

    fn show_indices(&mut self, indices: Vec<usize>) {
        self.displayed = indices;
        self.selected = 0;
    }
}

/// Which screen is active.
#[derive(Debug, Clone)]
pub enum Screen {
    ShowsList,
    EpisodeList(EpisodeView),
}

/// Work the event loop must start on the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Shows,
    Episodes {
        token: RequestToken,
        show_id: ShowId,
        show_name: String,
    },
}

/// A finished fetch coming back to the UI.
#[derive(Debug)]
pub enum FetchOutcome {
    Shows(Result<Arc<Vec<Show>>, CatalogError>),
    Episodes {
        token: RequestToken,
        show_id: ShowId,
        show_name: String,
        result: Result<Arc<Vec<Episode>>, CatalogError>,
    },
}

/// Main application state.
pub struct App {
    pub should_quit: bool,
    pub show_help: bool,
    pub input_mode: InputMode,
    pub screen: Screen,

    // Show browser
    pub shows: Option<Arc<Vec<Show>>>,
    pub visible_shows: Vec<usize>,
    pub show_selected: usize,
    pub show_query: String,

    pub episode_query: String,

    pub loading: bool,
    navigation: RequestToken,

    // Status message
    pub status_msg: String,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            show_help: false,
            input_mode: InputMode::Normal,
            screen: Screen::ShowsList,

            shows: None,
            visible_shows: Vec::new(),
            show_selected: 0,
            show_query: String::new(),

            episode_query: String::new(),

            loading: false,
            navigation: 0,

            status_msg: "Loading shows...".to_string(),
        }
    }

    /// The request issued at startup.
    pub fn start(&mut self) -> FetchRequest {
        self.loading = true;
        FetchRequest::Shows
    }

    pub fn heading(&self) -> &str {
        match &self.screen {
            Screen::ShowsList => SHOWS_HEADING,
            Screen::EpisodeList(view) => &view.show_name,
        }
    }

    fn next_navigation(&mut self) -> RequestToken {
        self.navigation += 1;
        self.navigation
    }

    /// The search text for the active screen.
    pub fn query(&self) -> &str {
        match self.screen {
            Screen::ShowsList => &self.show_query,
            Screen::EpisodeList(_) => &self.episode_query,
        }
    }

    pub fn push_query_char(&mut self, c: char) -> Option<FetchRequest> {
        match self.screen {
            Screen::ShowsList => {
                self.show_query.push(c);
                self.search_shows()
            }
            Screen::EpisodeList(_) => {
                self.episode_query.push(c);
                self.search_episodes();
                None
            }
        }
    }

    pub fn pop_query_char(&mut self) -> Option<FetchRequest> {
        match self.screen {
            Screen::ShowsList => {
                self.show_query.pop();
                self.search_shows()
            }
            Screen::EpisodeList(_) => {
                self.episode_query.pop();
                self.search_episodes();
                None
            }
        }
    }

    /// Re-filter the show collection with the current query. Asks for the
    /// collection when it has not arrived yet.
    pub fn search_shows(&mut self) -> Option<FetchRequest> {
        let Some(shows) = self.shows.clone() else {
            if self.loading {
                return None;
            }
            self.loading = true;
            return Some(FetchRequest::Shows);
        };
        self.visible_shows = filter_shows(&shows, &self.show_query);
        self.show_selected = 0;
        self.status_msg = format!(
            "{} shows found for \"{}\"",
            self.visible_shows.len(),
            if self.show_query.is_empty() { "all" } else { &self.show_query }
        );
        None
    }

    pub fn search_episodes(&mut self) {
        let Screen::EpisodeList(view) = &mut self.screen else {
            return;
        };
        let indices = filter_episodes(&view.episodes, &self.episode_query);
        view.show_indices(indices);
    }

    /// Start navigating to the episodes of the highlighted show.
    pub fn open_selected_show(&mut self) -> Option<FetchRequest> {
        if !matches!(self.screen, Screen::ShowsList) {
            return None;
        }
        let shows = self.shows.as_ref()?;
        let show = self
            .visible_shows
            .get(self.show_selected)
            .map(|&i| &shows[i])?;
        let (show_id, show_name) = (show.id, show.name.clone());

        let token = self.next_navigation();
        self.loading = true;
        self.status_msg = format!("Loading episodes for {}...", show_name);
        Some(FetchRequest::Episodes {
            token,
            show_id,
            show_name,
        })
    }

    /// Return to the show browser. Caches and search texts are kept.
    pub fn back_to_shows(&mut self) {
        self.next_navigation();
        self.screen = Screen::ShowsList;
        self.input_mode = InputMode::Normal;
        self.loading = false;
        self.status_msg = format!("{} shows", self.visible_shows.len());
    }

    /// Fold a finished fetch into the view state.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Shows(Ok(shows)) => {
                self.shows = Some(shows);
                if matches!(self.screen, Screen::ShowsList) {
                    self.loading = false;
                }
                self.search_shows();
            }
            FetchOutcome::Shows(Err(e)) => {
                tracing::error!(error = %e, "failed to load shows");
                self.loading = false;
                self.status_msg = e.user_message();
            }
            FetchOutcome::Episodes { token, .. } if token != self.navigation => {
                tracing::debug!(token, current = self.navigation, "discarding stale episode response");
            }
            FetchOutcome::Episodes {
                show_id,
                show_name,
                result: Ok(episodes),
                ..
            } => {
                self.loading = false;
                self.input_mode = InputMode::Normal;
                self.status_msg = format!("{} episodes loaded", episodes.len());
                self.screen = Screen::EpisodeList(EpisodeView::new(show_id, show_name, episodes));
            }
            FetchOutcome::Episodes {
                show_id,
                result: Err(e),
                ..
            } => {
                tracing::error!(show_id, error = %e, "failed to load episodes");
                self.loading = false;
                self.status_msg = e.user_message();
            }
        }
    }

    // ── Jump selector ──

    pub fn open_jump(&mut self) {
        if let Screen::EpisodeList(view) = &mut self.screen {
            view.jump.cursor = view.jump.chosen;
            view.jump.open = true;
        }
    }

    pub fn close_jump(&mut self) {
        if let Screen::EpisodeList(view) = &mut self.screen {
            view.jump.open = false;
        }
    }

    pub fn jump_is_open(&self) -> bool {
        matches!(&self.screen, Screen::EpisodeList(view) if view.jump.open)
    }

    pub fn jump_next(&mut self) {
        if let Screen::EpisodeList(view) = &mut self.screen {
            if view.jump.cursor + 1 < view.jump.entries.len() {
                view.jump.cursor += 1;
            }
        }
    }

    pub fn jump_prev(&mut self) {
        if let Screen::EpisodeList(view) = &mut self.screen {
            view.jump.cursor = view.jump.cursor.saturating_sub(1);
        }
    }

    /// Choose the jump entry at `index`: one episode, or all of them for
    /// the placeholder.
    pub fn choose_jump(&mut self, index: usize) {
        let Screen::EpisodeList(view) = &mut self.screen else {
            return;
        };
        let Some(entry) = view.jump.entries.get(index) else {
            return;
        };
        let indices = select_episode(&view.episodes, entry.value);
        view.jump.chosen = index;
        view.jump.cursor = index;
        view.jump.open = false;
        view.show_indices(indices);
    }

    pub fn choose_jump_at_cursor(&mut self) {
        if let Screen::EpisodeList(view) = &self.screen {
            let cursor = view.jump.cursor;
            self.choose_jump(cursor);
        }
    }

    // ── Card navigation ──

    fn cursor_mut(&mut self) -> (&mut usize, usize) {
        match &mut self.screen {
            Screen::ShowsList => (&mut self.show_selected, self.visible_shows.len()),
            Screen::EpisodeList(view) => (&mut view.selected, view.displayed.len()),
        }
    }

    pub fn select_next(&mut self) {
        let (cursor, len) = self.cursor_mut();
        if *cursor + 1 < len {
            *cursor += 1;
        }
    }

    pub fn select_prev(&mut self) {
        let (cursor, _) = self.cursor_mut();
        *cursor = cursor.saturating_sub(1);
    }

    pub fn select_page_down(&mut self, page: usize) {
        let (cursor, len) = self.cursor_mut();
        *cursor = (*cursor + page).min(len.saturating_sub(1));
    }

    pub fn select_page_up(&mut self, page: usize) {
        let (cursor, _) = self.cursor_mut();
        *cursor = cursor.saturating_sub(page);
    }

    pub fn select_first(&mut self) {
        let (cursor, _) = self.cursor_mut();
        *cursor = 0;
    }

    pub fn select_last(&mut self) {
        let (cursor, len) = self.cursor_mut();
        *cursor = len.saturating_sub(1);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
