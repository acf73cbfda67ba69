//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use bookdesk_core::routing::Route;

use crate::app::{App, AppState, Focus};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => {
            handle_login_input(app, key);
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    if app.is_authenticated() {
                        app.state = AppState::Normal;
                    } else {
                        app.start_login();
                    }
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
                _ => {}
            }
            return Ok(false);
        }
        AppState::Searching => {
            handle_search_input(app, key);
            return Ok(false);
        }
        AppState::Editing => {
            handle_edit_input(app, key);
            return Ok(false);
        }
        AppState::AddingCategory => {
            handle_category_input(app, key);
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            app.navigate(Route::TABS[index]);
        }
        KeyCode::Left => app.prev_tab(),
        KeyCode::Right => app.next_tab(),
        KeyCode::Char('L') => app.logout(),
        KeyCode::Char('r') => app.refresh_current(),
        KeyCode::Char('c') if app.route == Route::Statistics => app.cycle_chart(),
        _ => handle_screen_input(app, key),
    }

    Ok(false)
}

/// Keys that act on the current list screen
fn handle_screen_input(app: &mut App, key: KeyEvent) {
    let in_books_panel = app.route == Route::Authors && app.focus == Focus::Detail;

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            if in_books_panel {
                app.select_prev_book();
            } else if let Some(list) = app.current_list() {
                list.select_prev();
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if in_books_panel {
                app.select_next_book();
            } else if let Some(list) = app.current_list() {
                list.select_next();
            }
        }
        KeyCode::Char('[') | KeyCode::PageUp => {
            if let Some(list) = app.current_list() {
                list.prev_page();
            }
        }
        KeyCode::Char(']') | KeyCode::PageDown => {
            if let Some(list) = app.current_list() {
                list.next_page();
            }
        }
        KeyCode::Char('/') if !in_books_panel => {
            if app.current_list().is_some() {
                app.state = AppState::Searching;
            }
        }
        KeyCode::Char('x') => app.clear_search(),
        KeyCode::Char('e') => app.start_edit(),
        KeyCode::Char('a') => app.start_add_category(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Enter | KeyCode::Tab => app.toggle_author_books(),
        KeyCode::Esc => {
            if in_books_panel {
                app.focus = Focus::List;
            }
        }
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => app.search_pop(),
        KeyCode::Char(c) => app.search_push(c),
        _ => {}
    }
}

fn handle_edit_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Enter => app.submit_edit(),
        KeyCode::Tab | KeyCode::BackTab => {
            if let Some(form) = app.edit_form.as_mut() {
                form.toggle_focus();
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = app.edit_form.as_mut() {
                form.pop_char();
            }
        }
        KeyCode::Char(c) => {
            if let Some(form) = app.edit_form.as_mut() {
                form.push_char(c);
            }
        }
        _ => {}
    }
}

fn handle_category_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_add_category(),
        KeyCode::Enter => app.submit_category(),
        KeyCode::Tab | KeyCode::BackTab => {
            app.category_form.focus = app.category_form.focus.toggle();
        }
        KeyCode::Backspace => app.category_form.pop_char(),
        KeyCode::Char(c) => app.category_form.push_char(c),
        _ => {}
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        KeyCode::Enter => app.submit_login(),
        KeyCode::Tab | KeyCode::Down => app.login_form.focus = app.login_form.focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.login_form.focus = app.login_form.focus.prev(),
        KeyCode::Backspace => app.login_form.pop_char(),
        KeyCode::Char(c) => app.login_form.push_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookdesk_core::api::ApiClient;
    use bookdesk_core::auth::{AuthState, SessionData, SharedAuth};
    use bookdesk_core::config::Config;
    use bookdesk_core::models::LoginResponse;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(logged_in: bool) -> App {
        let session = logged_in.then(|| {
            let response: LoginResponse = serde_json::from_str(r#"{"token":"tok"}"#).unwrap();
            SessionData::from_login("admin@example.com", response, false)
        });
        let auth = SharedAuth::new(AuthState::new(session));
        let api = ApiClient::new("http://127.0.0.1:9", auth.clone()).unwrap();
        App::with_parts(Config::default(), auth, api)
    }

    #[tokio::test]
    async fn test_help_overlay_toggle() {
        let mut app = app(true);
        handle_input(&mut app, key(KeyCode::Char('?'))).unwrap();
        assert_eq!(app.state, AppState::ShowingHelp);
        handle_input(&mut app, key(KeyCode::Esc)).unwrap();
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_quit_requires_confirmation() {
        let mut app = app(true);
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))).unwrap());
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))).unwrap());
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).unwrap());
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_number_keys_switch_tabs() {
        let mut app = app(true);
        handle_input(&mut app, key(KeyCode::Char('4'))).unwrap();
        assert_eq!(app.route, Route::Audiobooks);
        handle_input(&mut app, key(KeyCode::Right)).unwrap();
        assert_eq!(app.route, Route::Categories);
        handle_input(&mut app, key(KeyCode::Char('1'))).unwrap();
        assert_eq!(app.route, Route::Home);
    }

    #[tokio::test]
    async fn test_search_typing_resets_page_and_waits() {
        let mut app = app(true);
        handle_input(&mut app, key(KeyCode::Char('2'))).unwrap();
        handle_input(&mut app, key(KeyCode::Char('/'))).unwrap();
        assert_eq!(app.state, AppState::Searching);

        for c in "ada".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(app.users.search_input(), "ada");
        assert_eq!(app.users.search_term(), "");
        assert!(app.users.is_search_pending());
        assert_eq!(app.users.page(), 1);

        handle_input(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_login_form_typing() {
        let mut app = app(false);
        app.login_form.email.clear();
        app.login_form.password.clear();
        app.start_login();

        for c in "a@b.co".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        handle_input(&mut app, key(KeyCode::Tab)).unwrap();
        handle_input(&mut app, key(KeyCode::Char('x'))).unwrap();

        assert_eq!(app.login_form.email, "a@b.co");
        assert_eq!(app.login_form.password, "x");
        assert_eq!(app.state, AppState::LoggingIn);
    }

    #[tokio::test]
    async fn test_invalid_login_shows_error_without_request() {
        let mut app = app(false);
        app.login_form.email = "not-an-email".to_string();
        app.login_form.password = "pw".to_string();

        handle_input(&mut app, key(KeyCode::Enter)).unwrap();

        assert!(!app.login_pending);
        assert_eq!(app.login_form.error.as_deref(), Some("Invalid email"));
    }

    #[tokio::test]
    async fn test_cancel_quit_returns_to_login() {
        let mut app = app(false);
        handle_input(&mut app, key(KeyCode::Esc)).unwrap();
        assert_eq!(app.state, AppState::ConfirmingQuit);
        handle_input(&mut app, key(KeyCode::Char('n'))).unwrap();
        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.route, Route::Login);
    }
}
