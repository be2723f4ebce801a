//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions, per [`Mode`].  Adding a new
//! keybinding is a single match arm in the handler for its mode.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm below that calls it.
//! 3. Update the help text in [`crate::ui`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Field, Mode};

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return;
    }

    match app.mode {
        Mode::Browse => browse(app, key),
        Mode::Search => search(app, key),
        Mode::Compose(_) | Mode::Attach => edit_text(app, key),
        Mode::ConfirmDelete(_) => app.answer_delete(matches!(key.code, KeyCode::Char('y' | 'Y'))),
    }
}

fn browse(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('/') => app.mode = Mode::Search,
        KeyCode::Char('n') => app.mode = Mode::Compose(Field::Author),
        KeyCode::Char('a') => app.mode = Mode::Attach,
        KeyCode::Char('x') => app.clear_attachment(),
        KeyCode::Char('l') => app.like_selected(),
        KeyCode::Char('d') => app.request_delete_selected(),
        _ => {}
    }
}

fn search(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.mode = Mode::Browse,
        KeyCode::Backspace => app.edit_query(|q| {
            q.pop();
        }),
        KeyCode::Char(c) => app.edit_query(|q| q.push(c)),
        _ => {}
    }
}

fn edit_text(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.mode = Mode::Browse,
        KeyCode::Tab => app.toggle_field(),
        KeyCode::Enter => match app.mode {
            Mode::Attach => app.submit_attachment(),
            _ => app.submit_post(),
        },
        KeyCode::Backspace => {
            if let Some(text) = app.focused_draft() {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(text) = app.focused_draft() {
                text.push(c);
            }
        }
        _ => {}
    }
}
