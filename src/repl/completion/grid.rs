//! Candidate grid layout and rendering
//!
//! Candidates are laid out row by row in equally wide columns below the
//! prompt. Navigation moves the selection inside that grid; rendering draws it
//! and puts the cursor back where the user was typing.

use std::io;

use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use unicode_width::UnicodeWidthStr;

use super::matcher::Candidate;

/// Direction of a selection move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Previous cell, wrapping to the last
    Left,
    /// Next cell, wrapping to the first
    Right,
    /// Same column, previous row
    Up,
    /// Same column, next row
    Down,
    /// First cell of the row
    Home,
    /// Last cell of the row
    End,
}

/// Grid geometry for a candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    /// Width of one cell, gutter included
    pub column_width: usize,
    /// Cells per row, at least 1
    pub columns: usize,
    /// Number of rows
    pub rows: usize,
    /// Number of candidates
    pub count: usize,
}

impl GridLayout {
    /// Compute the layout
    ///
    /// # Arguments
    /// * `candidates` - Candidates to lay out
    /// * `prefix_width` - Display width of the shared prefix drawn before each
    ///   candidate
    /// * `terminal_width` - Terminal width in columns
    ///
    /// # Returns
    /// * `Self` - Layout with `columns >= 1`
    pub fn compute(candidates: &[Candidate], prefix_width: usize, terminal_width: usize) -> Self {
        let widest = candidates
            .iter()
            .map(|c| c.suffix.width())
            .max()
            .unwrap_or(0);
        let column_width = widest + prefix_width + 1;
        let columns = (terminal_width.saturating_sub(1) / column_width).max(1);
        let rows = candidates.len().div_ceil(columns);

        Self {
            column_width,
            columns,
            rows,
            count: candidates.len(),
        }
    }

    /// Cell width used for drawing, with leftover space shared between columns
    pub fn padded_width(&self, terminal_width: usize) -> usize {
        let used = self.column_width * self.columns;
        let spare = terminal_width.saturating_sub(1).saturating_sub(used);
        self.column_width + spare / self.columns
    }

    /// Number of cells in a full grid
    pub fn matrix_size(&self) -> usize {
        self.rows * self.columns
    }

    /// Move a selection
    ///
    /// # Arguments
    /// * `selected` - Current selection, in `0..count`
    /// * `nav` - Requested move
    ///
    /// # Returns
    /// * `usize` - New selection, in `0..count`
    pub fn navigate(&self, selected: usize, nav: Navigation) -> usize {
        let n = self.count;
        if n == 0 {
            return 0;
        }
        let cols = self.columns;
        let matrix = self.matrix_size();

        match nav {
            Navigation::Right => (selected + 1) % n,
            Navigation::Left => (selected + n - 1) % n,
            Navigation::Down => {
                let next = selected + cols;
                if next >= matrix {
                    next - matrix
                } else if next >= n {
                    // Short last row: wrap to the top of the same column
                    next + cols - matrix
                } else {
                    next
                }
            }
            Navigation::Up => {
                if selected >= cols {
                    selected - cols
                } else {
                    let wrapped = selected + matrix - cols;
                    if wrapped >= n { wrapped - cols } else { wrapped }
                }
            }
            Navigation::Home => selected - selected % cols,
            Navigation::End => (selected - selected % cols + cols - 1).min(n - 1),
        }
    }
}

/// What the renderer needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Candidates in presentation order
    pub candidates: &'a [Candidate],
    /// Text already typed that every candidate shares
    pub prefix: &'a str,
    /// Highlighted cell, if selecting
    pub selected: Option<usize>,
    /// Terminal width in columns
    pub terminal_width: u16,
    /// Lines from the cursor row to the end of the prompt+buffer
    pub lines_below_cursor: u16,
    /// Column to return the cursor to
    pub cursor_column: u16,
}

/// Draws the candidate grid below the prompt.
#[derive(Debug, Clone, Default)]
pub struct GridRenderer;

impl GridRenderer {
    /// Create a renderer
    pub fn new() -> Self {
        Self
    }

    /// Build the escape sequence for one frame
    ///
    /// The cursor ends where it started, so drawing the same frame twice gives
    /// the same screen.
    ///
    /// # Arguments
    /// * `frame` - Grid contents and cursor geometry
    ///
    /// # Returns
    /// * `io::Result<(GridLayout, Vec<u8>)>` - Layout used and bytes to write
    pub fn render(&self, frame: &Frame<'_>) -> io::Result<(GridLayout, Vec<u8>)> {
        let width = usize::from(frame.terminal_width);
        let prefix_width = frame.prefix.width();
        let layout = GridLayout::compute(frame.candidates, prefix_width, width);
        let cell_width = layout.padded_width(width);

        let mut out = Vec::new();
        let mut lines_moved = usize::from(frame.lines_below_cursor);
        queue!(out, Print("\r\n".repeat(lines_moved)), Clear(ClearType::FromCursorDown))?;

        for (idx, candidate) in frame.candidates.iter().enumerate() {
            if idx > 0 && idx % layout.columns == 0 {
                queue!(out, Print("\r\n"))?;
                lines_moved += 1;
            }

            let highlighted = frame.selected == Some(idx);
            if highlighted {
                queue!(out, SetAttribute(Attribute::Reverse))?;
            }

            let used = prefix_width + candidate.suffix.width();
            queue!(
                out,
                Print(frame.prefix),
                Print(&candidate.suffix),
                Print(" ".repeat(cell_width.saturating_sub(used)))
            )?;

            if highlighted {
                queue!(out, SetAttribute(Attribute::Reset))?;
            }
        }

        let up = u16::try_from(lines_moved).unwrap_or(u16::MAX);
        if up > 0 {
            queue!(out, MoveUp(up))?;
        }
        queue!(out, MoveToColumn(frame.cursor_column))?;

        Ok((layout, out))
    }
}
