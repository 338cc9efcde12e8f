use crossterm::event::{KeyCode, KeyModifiers};

use super::state::App;

/// Actions the report window can perform in response to input.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Submit,
    Insert(char),
    Backspace,
    ClearInput,
    ScrollUp,
    ScrollDown,
    DismissError,
}

/// Map a key press to an Action.
pub fn handle_key(app: &App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    // Error dialog captures all keys except quit
    if app.error.is_some() {
        return match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Action::DismissError,
            _ => Action::None,
        };
    }

    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Esc => Action::Quit,

        // One run at a time
        KeyCode::Enter if app.running => Action::None,
        KeyCode::Enter => Action::Submit,

        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => Action::ClearInput,
        KeyCode::Char(c) => Action::Insert(c),
        KeyCode::Backspace => Action::Backspace,

        KeyCode::Up | KeyCode::PageUp => Action::ScrollUp,
        KeyCode::Down | KeyCode::PageDown => Action::ScrollDown,

        _ => Action::None,
    }
}
