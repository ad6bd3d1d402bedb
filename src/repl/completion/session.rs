//! Completion session state machine
//!
//! A session is either idle (`Typing`), showing an ambiguous candidate list
//! (`Listing`), or letting the user pick from that list (`Selecting`).
//!
//! ```text
//!   Typing --trigger, ambiguous--> Listing --trigger, buffer unchanged--> Selecting
//!     ^                               |                                      |
//!     +------- any other key ---------+---- confirm / cancel / other key ----+
//! ```
//!
//! The session owns the completion tree and is owned by the line editor. It
//! reaches the buffer and the screen only through [`TerminalDriver`].

use std::io;
use std::mem;

use tracing::debug;
use unicode_width::UnicodeWidthStr;

use super::driver::TerminalDriver;
use super::grid::{Frame, GridLayout, GridRenderer, Navigation};
use super::matcher::{MatchResult, PathMatcher};
use super::tree::CompletionTree;

/// Buffer contents captured when a listing was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Buffer contents
    pub buffer: Vec<char>,
    /// Cursor offset
    pub cursor: usize,
}

impl Snapshot {
    fn capture<T: TerminalDriver>(term: &T) -> Self {
        Self {
            buffer: term.buffer().to_vec(),
            cursor: term.cursor(),
        }
    }

    /// Whether the terminal still holds exactly this buffer and cursor
    pub fn matches<T: TerminalDriver>(&self, term: &T) -> bool {
        self.cursor == term.cursor() && self.buffer.as_slice() == term.buffer()
    }
}

/// Where the session currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Free typing, no grid on screen
    #[default]
    Typing,
    /// Ambiguous candidates shown, nothing highlighted
    Listing {
        result: MatchResult,
        snapshot: Snapshot,
    },
    /// Candidates shown with one highlighted
    Selecting {
        result: MatchResult,
        snapshot: Snapshot,
        /// Always in `0..result.len()`
        selected: usize,
        /// Always at least 1
        columns: usize,
    },
}

/// Tab-completion state machine for one line editor.
#[derive(Debug)]
pub struct CompletionSession {
    tree: CompletionTree,
    state: SessionState,
    renderer: GridRenderer,
}

impl CompletionSession {
    /// Create a session over a completion tree
    ///
    /// # Arguments
    /// * `tree` - Vocabulary to complete against
    ///
    /// # Returns
    /// * `Self` - Session in `Typing`
    pub fn new(tree: CompletionTree) -> Self {
        Self {
            tree,
            state: SessionState::Typing,
            renderer: GridRenderer::new(),
        }
    }

    /// Completion vocabulary
    pub fn tree(&self) -> &CompletionTree {
        &self.tree
    }

    /// Current state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Whether a candidate grid is on screen
    pub fn is_active(&self) -> bool {
        !matches!(self.state, SessionState::Typing)
    }

    /// Run the matcher for a line without touching any terminal
    pub fn candidates(&self, line: &str, cursor: usize) -> MatchResult {
        PathMatcher::new(&self.tree).complete(line, cursor)
    }

    /// Handle the completion trigger key
    ///
    /// In `Typing` this completes the word under the cursor. A second trigger
    /// on an unchanged listing starts selection; in `Selecting` it moves to the
    /// next candidate.
    ///
    /// # Arguments
    /// * `term` - Line buffer and screen
    ///
    /// # Returns
    /// * `io::Result<()>` - Terminal write failures
    pub fn trigger<T: TerminalDriver>(&mut self, term: &mut T) -> io::Result<()> {
        match mem::take(&mut self.state) {
            SessionState::Typing => self.complete(term),
            SessionState::Listing { result, snapshot } => {
                if !snapshot.matches(&*term) {
                    debug!("buffer changed since listing, completing again");
                    term.refresh()?;
                    return self.complete(term);
                }

                let layout = draw(&self.renderer, term, &result, Some(0))?;
                debug!(
                    "selecting among {} candidates in {} columns",
                    result.len(),
                    layout.columns
                );
                self.state = SessionState::Selecting {
                    result,
                    snapshot,
                    selected: 0,
                    columns: layout.columns,
                };
                Ok(())
            }
            state @ SessionState::Selecting { .. } => {
                self.state = state;
                self.navigate(term, Navigation::Right)
            }
        }
    }

    /// Insert the highlighted candidate and return to `Typing`
    pub fn confirm<T: TerminalDriver>(&mut self, term: &mut T) -> io::Result<()> {
        match mem::take(&mut self.state) {
            SessionState::Selecting {
                result, selected, ..
            } => {
                if let Some(candidate) = result.candidates.get(selected) {
                    debug!("selected candidate '{}'", candidate.suffix);
                    term.insert(&candidate.insertion());
                }
                term.refresh()
            }
            SessionState::Listing { .. } => term.refresh(),
            SessionState::Typing => Ok(()),
        }
    }

    /// Drop the grid and return to `Typing` with the buffer untouched
    pub fn cancel<T: TerminalDriver>(&mut self, term: &mut T) -> io::Result<()> {
        if self.is_active() {
            debug!("completion cancelled");
        }
        self.leave(term)
    }

    /// Return to `Typing`, erasing the grid if one is shown
    pub fn leave<T: TerminalDriver>(&mut self, term: &mut T) -> io::Result<()> {
        match mem::take(&mut self.state) {
            SessionState::Typing => Ok(()),
            SessionState::Listing { .. } | SessionState::Selecting { .. } => term.refresh(),
        }
    }

    /// Move the highlight while selecting
    ///
    /// # Arguments
    /// * `term` - Line buffer and screen
    /// * `nav` - Requested move
    ///
    /// # Returns
    /// * `io::Result<()>` - Terminal write failures
    pub fn navigate<T: TerminalDriver>(&mut self, term: &mut T, nav: Navigation) -> io::Result<()> {
        let SessionState::Selecting {
            result,
            selected,
            columns,
            ..
        } = &mut self.state
        else {
            return Ok(());
        };

        let prefix = typed_prefix(&*term, result.offset);
        let layout = GridLayout::compute(
            &result.candidates,
            prefix.width(),
            usize::from(term.width()),
        );
        *selected = layout.navigate(*selected, nav);
        *columns = draw(&self.renderer, term, result, Some(*selected))?.columns;
        Ok(())
    }

    /// Redraw after the terminal changed size
    pub fn on_resize<T: TerminalDriver>(&mut self, term: &mut T) -> io::Result<()> {
        if term.width() == 0 {
            return self.leave(term);
        }

        match &mut self.state {
            SessionState::Typing => Ok(()),
            SessionState::Listing { result, .. } => {
                draw(&self.renderer, term, result, None)?;
                Ok(())
            }
            SessionState::Selecting {
                result,
                selected,
                columns,
                ..
            } => {
                *columns = draw(&self.renderer, term, result, Some(*selected))?.columns;
                Ok(())
            }
        }
    }

    fn complete<T: TerminalDriver>(&mut self, term: &mut T) -> io::Result<()> {
        if term.width() == 0 {
            debug!("terminal width unknown, skipping completion");
            return Ok(());
        }

        let line = term.line();
        let result = self.candidates(&line, term.cursor());

        match result.candidates.as_slice() {
            [] => Ok(()),
            [only] => {
                term.insert(&only.insertion());
                term.refresh()
            }
            _ => {
                let prefix = result.common_prefix();
                if !prefix.is_empty() {
                    debug!("inserting common prefix '{}'", prefix);
                    term.insert(&prefix);
                    return term.refresh();
                }

                let snapshot = Snapshot::capture(&*term);
                draw(&self.renderer, term, &result, None)?;
                debug!("listing {} candidates", result.len());
                self.state = SessionState::Listing { result, snapshot };
                Ok(())
            }
        }
    }
}

/// Already-typed part of the segment every candidate continues
fn typed_prefix<T: TerminalDriver>(term: &T, offset: usize) -> String {
    let buffer = term.buffer();
    let cursor = term.cursor().min(buffer.len());
    buffer[cursor.saturating_sub(offset)..cursor].iter().collect()
}

fn draw<T: TerminalDriver>(
    renderer: &GridRenderer,
    term: &mut T,
    result: &MatchResult,
    selected: Option<usize>,
) -> io::Result<GridLayout> {
    let prefix = typed_prefix(&*term, result.offset);
    let frame = Frame {
        candidates: &result.candidates,
        prefix: &prefix,
        selected,
        terminal_width: term.width(),
        lines_below_cursor: term.lines_below_cursor(),
        cursor_column: term.cursor_column(),
    };
    let (layout, bytes) = renderer.render(&frame)?;
    term.write_raw(&bytes)?;
    Ok(layout)
}
