//! Terminal driver contract
//!
//! The completion session never touches the terminal or the line buffer
//! directly. It goes through this trait, implemented by the line editor and by
//! test doubles.

use std::io;

/// Line buffer and screen access needed by the completion session.
pub trait TerminalDriver {
    /// Current buffer contents as code points
    fn buffer(&self) -> &[char];

    /// Cursor offset into the buffer, in code points
    fn cursor(&self) -> usize;

    /// Insert text at the cursor and advance the cursor past it
    fn insert(&mut self, text: &str);

    /// Terminal width in columns
    fn width(&self) -> u16;

    /// Number of screen lines from the cursor row to the last row occupied by
    /// prompt and buffer, inclusive
    fn lines_below_cursor(&self) -> u16;

    /// Screen column of the cursor
    fn cursor_column(&self) -> u16;

    /// Write raw bytes (escape sequences included) to the terminal
    fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Redraw prompt and buffer, erasing anything drawn below them
    fn refresh(&mut self) -> io::Result<()>;

    /// Buffer contents as a string
    fn line(&self) -> String {
        self.buffer().iter().collect()
    }
}
