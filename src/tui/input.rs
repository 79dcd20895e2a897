//! Keyboard input for the interactive display.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::errors::SpeedDialError;

/// What a key press asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Press the start/stop button
    Toggle,
    /// Flip between the light and dark palettes
    ToggleTheme,
    Quit,
}

/// Map a key event to an action. Only presses count; repeats and
/// releases are ignored.
pub fn action_for_key(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
        (_, KeyCode::Char('q')) | (_, KeyCode::Esc) => Some(Action::Quit),
        (_, KeyCode::Enter) | (_, KeyCode::Char(' ')) | (_, KeyCode::Char('s')) => {
            Some(Action::Toggle)
        }
        (_, KeyCode::Char('d')) => Some(Action::ToggleTheme),
        _ => None,
    }
}

/// Wait up to `timeout` for a key press and translate it.
///
/// Returns `Ok(None)` when nothing arrived or the event was not a
/// mapped key.
pub fn poll_action(timeout: Duration) -> Result<Option<Action>, SpeedDialError> {
    if !event::poll(timeout)? {
        return Ok(None);
    }

    match event::read()? {
        Event::Key(key) => Ok(action_for_key(key)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_toggle_keys() {
        assert_eq!(action_for_key(press(KeyCode::Enter)), Some(Action::Toggle));
        assert_eq!(action_for_key(press(KeyCode::Char(' '))), Some(Action::Toggle));
        assert_eq!(action_for_key(press(KeyCode::Char('s'))), Some(Action::Toggle));
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(action_for_key(press(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(action_for_key(press(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(
            action_for_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_theme_key() {
        assert_eq!(action_for_key(press(KeyCode::Char('d'))), Some(Action::ToggleTheme));
    }

    #[test]
    fn test_unmapped_and_released_keys() {
        assert_eq!(action_for_key(press(KeyCode::Char('x'))), None);
        assert_eq!(action_for_key(press(KeyCode::Tab)), None);

        let release = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(action_for_key(release), None);
    }
}
