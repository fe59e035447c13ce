//! Translation of terminal key events into typed characters.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("key {0:?} does not type a character")]
    UnsupportedKey(KeyCode),
    #[error("key {code:?} pressed with modifiers {modifiers:?}")]
    Modified {
        code: KeyCode,
        modifiers: KeyModifiers,
    },
    #[error("key {0:?} was not a press")]
    NotAPress(KeyCode),
}

/// Returns the character a key press types. Shifted characters are accepted;
/// control and alt chords are not.
pub fn typed_char(key: &KeyEvent) -> Result<char, InputError> {
    if key.kind != KeyEventKind::Press {
        return Err(InputError::NotAPress(key.code));
    }

    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
    {
        return Err(InputError::Modified {
            code: key.code,
            modifiers: key.modifiers,
        });
    }

    match key.code {
        KeyCode::Char(c) => Ok(c),
        code => Err(InputError::UnsupportedKey(code)),
    }
}
