//! Key symbols and their dispatch to the completion session
//!
//! The editor decodes every terminal key event into a [`Key`] and hands it to
//! [`KeyDispatcher::dispatch`]. Keys the session does not want come back as
//! [`Dispatch::Passthrough`] and are processed as ordinary editing input.

use std::io;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

use super::driver::TerminalDriver;
use super::grid::Navigation;
use super::session::{CompletionSession, SessionState};

/// Key symbols the completion engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Complete, or advance the selection
    Trigger,
    /// Accept the highlighted candidate
    Confirm,
    /// Close the grid without inserting anything
    Cancel,
    /// Move the highlight
    Navigate(Navigation),
    /// Anything else
    Other,
}

impl From<&KeyEvent> for Key {
    fn from(event: &KeyEvent) -> Self {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        match event.code {
            KeyCode::Tab => Key::Trigger,
            KeyCode::Enter => Key::Confirm,
            KeyCode::Esc => Key::Cancel,
            KeyCode::Left => Key::Navigate(Navigation::Left),
            KeyCode::Right => Key::Navigate(Navigation::Right),
            KeyCode::Up => Key::Navigate(Navigation::Up),
            KeyCode::Down => Key::Navigate(Navigation::Down),
            KeyCode::Home => Key::Navigate(Navigation::Home),
            KeyCode::End => Key::Navigate(Navigation::End),
            KeyCode::Char(c) if ctrl => match c {
                'i' => Key::Trigger,
                'j' | 'm' => Key::Confirm,
                'g' | 'c' => Key::Cancel,
                'b' => Key::Navigate(Navigation::Left),
                'f' => Key::Navigate(Navigation::Right),
                'p' => Key::Navigate(Navigation::Up),
                'n' => Key::Navigate(Navigation::Down),
                'a' => Key::Navigate(Navigation::Home),
                'e' => Key::Navigate(Navigation::End),
                _ => Key::Other,
            },
            _ => Key::Other,
        }
    }
}

/// Whether the editor should still process a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The session handled the key
    Consumed,
    /// The editor must handle the key as ordinary input
    Passthrough,
}

/// Routes keys to completion session transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDispatcher;

impl KeyDispatcher {
    /// Create a dispatcher
    pub fn new() -> Self {
        Self
    }

    /// Apply a key to the session
    ///
    /// # Arguments
    /// * `session` - Session owned by the editor
    /// * `term` - Line buffer and screen
    /// * `key` - Decoded key
    ///
    /// # Returns
    /// * `io::Result<Dispatch>` - Whether the editor should also handle the key
    pub fn dispatch<T: TerminalDriver>(
        &self,
        session: &mut CompletionSession,
        term: &mut T,
        key: Key,
    ) -> io::Result<Dispatch> {
        let phase = Phase::of(session.state());
        trace!("dispatching {:?} while {:?}", key, phase);

        match (phase, key) {
            (_, Key::Trigger) => {
                session.trigger(term)?;
                Ok(Dispatch::Consumed)
            }

            (Phase::Typing, _) => Ok(Dispatch::Passthrough),

            (Phase::Listing, Key::Cancel) => {
                session.cancel(term)?;
                Ok(Dispatch::Consumed)
            }
            (Phase::Listing, Key::Confirm | Key::Navigate(_) | Key::Other) => {
                session.leave(term)?;
                Ok(Dispatch::Passthrough)
            }

            (Phase::Selecting, Key::Confirm) => {
                session.confirm(term)?;
                Ok(Dispatch::Consumed)
            }
            (Phase::Selecting, Key::Cancel) => {
                session.cancel(term)?;
                Ok(Dispatch::Consumed)
            }
            (Phase::Selecting, Key::Navigate(nav)) => {
                session.navigate(term, nav)?;
                Ok(Dispatch::Consumed)
            }
            (Phase::Selecting, Key::Other) => {
                session.leave(term)?;
                Ok(Dispatch::Passthrough)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Typing,
    Listing,
    Selecting,
}

impl Phase {
    fn of(state: &SessionState) -> Self {
        match state {
            SessionState::Typing => Phase::Typing,
            SessionState::Listing { .. } => Phase::Listing,
            SessionState::Selecting { .. } => Phase::Selecting,
        }
    }
}
