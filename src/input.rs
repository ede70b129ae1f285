use crate::app::{App, FetchRequest, InputMode, Screen};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Cards moved by PgUp/PgDn.
const PAGE: usize = 5;

/// Route a key press. Returns the fetch the event loop should start, if any.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Option<FetchRequest> {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return None;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return None;
    }

    if app.input_mode == InputMode::Editing {
        return handle_search_input(app, key);
    }

    if app.jump_is_open() {
        handle_jump_key(app, key);
        return None;
    }

    if key.code == KeyCode::Char('?') {
        app.show_help = true;
        return None;
    }

    match app.screen {
        Screen::ShowsList => handle_shows_key(app, key),
        Screen::EpisodeList(_) => {
            handle_episodes_key(app, key);
            None
        }
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Option<FetchRequest> {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            None
        }
        KeyCode::Backspace => app.pop_query_char(),
        KeyCode::Char(c) => app.push_query_char(c),
        _ => None,
    }
}

fn handle_navigation(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::PageDown => app.select_page_down(PAGE),
        KeyCode::PageUp => app.select_page_up(PAGE),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        _ => {}
    }
}

fn handle_shows_key(app: &mut App, key: KeyEvent) -> Option<FetchRequest> {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            None
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
            None
        }
        KeyCode::Enter => app.open_selected_show(),
        _ => {
            handle_navigation(app, key);
            None
        }
    }
}

fn handle_episodes_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('/') => app.input_mode = InputMode::Editing,
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => app.back_to_shows(),
        KeyCode::Char('e') => app.open_jump(),
        _ => handle_navigation(app, key),
    }
}

fn handle_jump_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_jump(),
        KeyCode::Down | KeyCode::Char('j') => app.jump_next(),
        KeyCode::Up | KeyCode::Char('k') => app.jump_prev(),
        KeyCode::Enter => app.choose_jump_at_cursor(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::FetchOutcome;
    use crate::app::tests::loaded_app;
    use crate::catalog::tests::episode;
    use std::sync::Arc;

    fn press(app: &mut App, code: KeyCode) -> Option<FetchRequest> {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn open_first_show(app: &mut App) {
        let Some(FetchRequest::Episodes { token, show_id, show_name }) = press(app, KeyCode::Enter)
        else {
            panic!("expected an episode request");
        };
        app.apply(FetchOutcome::Episodes {
            token,
            show_id,
            show_name,
            result: Ok(Arc::new(vec![
                episode(1, 1, 1, "Pilot"),
                episode(2, 1, 2, "Episode 2"),
            ])),
        });
    }

    fn shown(app: &App) -> Vec<String> {
        match &app.screen {
            Screen::EpisodeList(view) => view.displayed_episodes().map(|e| e.name.clone()).collect(),
            Screen::ShowsList => Vec::new(),
        }
    }

    #[test]
    fn test_slash_starts_search_and_keys_filter() {
        let mut app = loaded_app(&["Community", "Lost"]);
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode, InputMode::Editing);

        // 'q' is text while editing
        type_text(&mut app, "q");
        assert!(!app.should_quit);
        assert_eq!(app.show_query, "q");

        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "com");
        assert_eq!(app.visible_shows.len(), 1);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_enter_requests_episodes() {
        let mut app = loaded_app(&["Lost"]);
        let request = press(&mut app, KeyCode::Enter);
        assert!(matches!(request, Some(FetchRequest::Episodes { show_id: 1, .. })));
    }

    #[test]
    fn test_episode_screen_keys() {
        let mut app = loaded_app(&["Lost"]);
        open_first_show(&mut app);

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "PILOT");
        press(&mut app, KeyCode::Esc);
        assert_eq!(shown(&app), vec!["Pilot"]);

        // Esc outside the search bar goes back
        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.screen, Screen::ShowsList));
    }

    #[test]
    fn test_jump_keys() {
        let mut app = loaded_app(&["Lost"]);
        open_first_show(&mut app);

        press(&mut app, KeyCode::Char('e'));
        assert!(app.jump_is_open());
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(shown(&app), vec!["Episode 2"]);

        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Enter);
        assert_eq!(shown(&app), vec!["Pilot", "Episode 2"]);
    }

    #[test]
    fn test_help_toggle_and_quit() {
        let mut app = loaded_app(&["Lost"]);
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_while_editing() {
        let mut app = loaded_app(&["Lost"]);
        press(&mut app, KeyCode::Char('/'));
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
