//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, LoginFocus};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    match app.state {
        AppState::LoggingIn => handle_login_input(app, key),
        AppState::Home => handle_home_input(app, key),
        AppState::ConfirmingQuit => handle_quit_input(app, key),
        AppState::Quitting => true,
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => app.request_quit(),
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password => {
                if app.login.can_submit() {
                    app.submit_login();
                } else {
                    app.login_focus = LoginFocus::Button;
                }
            }
            LoginFocus::Button => {
                // Disabled button: invalid form or a request already pending
                if app.login.can_submit() {
                    app.submit_login();
                }
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => app.login.pop_email_char(),
            LoginFocus::Password => app.login.pop_password_char(),
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                app.login.push_email_char(c);
            }
            LoginFocus::Password => {
                app.login.push_password_char(c);
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    false
}

fn handle_home_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.request_quit(),
        KeyCode::Char('l') => app.sign_out(),
        _ => {}
    }
    false
}

fn handle_quit_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.state = AppState::Quitting;
            true
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.cancel_quit();
            false
        }
        _ => false,
    }
}
