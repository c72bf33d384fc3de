//! Keyboard input for the session loop
//!
//! The loop waits for at most one tick for a key so it can re-check resize and
//! dirty state even when nothing is pressed.

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Source of key presses with a bounded wait
pub trait InputSource {
    /// Wait up to `timeout` for a key press; `None` when the wait expires
    fn next_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>>;
}

/// Reads key presses from the real terminal
pub struct CrosstermInput;

impl InputSource for CrosstermInput {
    fn next_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>> {
        if !event::poll(timeout).context("Failed to poll terminal events")? {
            return Ok(None);
        }
        match event::read().context("Failed to read terminal event")? {
            // Release/repeat events are only reported by some terminals; act on presses
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
            _ => Ok(None),
        }
    }
}

/// `q` or Ctrl-C
pub fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[cfg(test)]
pub(crate) use scripted::ScriptedInput;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_keys() {
        assert!(is_quit(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit(&KeyEvent::new(KeyCode::Down, KeyModifiers::NONE)));
    }
}
