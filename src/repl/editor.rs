//! Line editor on top of crossterm
//!
//! [`Terminal`] owns the line buffer and knows how to redraw it; it is the
//! [`TerminalDriver`] the completion session works through. [`LineEditor`]
//! reads crossterm events, offers every key to the completion dispatcher
//! first and applies the keys it passes through as ordinary edits.
//!
//! The editor keeps the terminal in raw mode only while a line is being read.

use std::io::{self, Write};

use crossterm::cursor::{MoveDown, MoveTo, MoveToColumn, MoveUp};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::queue;
use tracing::{debug, trace, warn};
use unicode_width::UnicodeWidthChar;

use super::completion::{
    CompletionSession, CompletionTree, Dispatch, Key, KeyDispatcher, TerminalDriver,
};
use super::history::ShellHistory;
use super::prompt::ShellPrompt;

/// How reading a line ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The user submitted a line
    Line(String),
    /// Ctrl-C discarded the line
    Interrupted,
    /// Ctrl-D on an empty line
    Eof,
}

/// Line buffer drawn after a prompt.
#[derive(Debug)]
pub struct Terminal<W: Write> {
    out: W,
    prompt: ShellPrompt,
    buffer: Vec<char>,
    cursor: usize,
    width: u16,
    /// Screen row of the cursor, counted from the prompt's first row
    cursor_row: u16,
}

impl<W: Write> Terminal<W> {
    /// Create a terminal writing to `out`
    ///
    /// # Arguments
    /// * `out` - Output stream
    /// * `width` - Terminal width in columns
    pub fn new(out: W, width: u16) -> Self {
        Self {
            out,
            prompt: ShellPrompt::new("", "", false),
            buffer: Vec::new(),
            cursor: 0,
            width,
            cursor_row: 0,
        }
    }

    /// Everything written so far
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Screen row and column of the cell after the first `chars` characters
    fn position(&self, chars: usize) -> (u16, u16) {
        let width = usize::from(self.width.max(1));
        let offset = self.prompt.width()
            + self.buffer[..chars.min(self.buffer.len())]
                .iter()
                .map(|c| c.width().unwrap_or(0))
                .sum::<usize>();
        (
            u16::try_from(offset / width).unwrap_or(u16::MAX),
            u16::try_from(offset % width).unwrap_or(u16::MAX),
        )
    }

    fn begin(&mut self, prompt: ShellPrompt) -> io::Result<()> {
        self.prompt = prompt;
        self.buffer.clear();
        self.cursor = 0;
        self.cursor_row = 0;
        self.refresh()
    }

    /// Move below the line so the next output starts on a fresh row
    fn finish(&mut self) -> io::Result<()> {
        let (cursor_row, _) = self.position(self.cursor);
        let (end_row, _) = self.position(self.buffer.len());
        if end_row > cursor_row {
            queue!(self.out, MoveDown(end_row - cursor_row))?;
        }
        queue!(self.out, Print("\r\n"))?;
        self.cursor_row = 0;
        self.out.flush()
    }

    fn set_width(&mut self, width: u16) {
        self.width = width;
    }

    fn set_line(&mut self, line: &str) -> io::Result<()> {
        self.buffer = line.chars().collect();
        self.cursor = self.buffer.len();
        self.refresh()
    }

    fn insert_char(&mut self, c: char) -> io::Result<()> {
        self.buffer.insert(self.cursor, c);
        self.cursor += 1;
        self.refresh()
    }

    fn backspace(&mut self) -> io::Result<()> {
        if self.cursor == 0 {
            return Ok(());
        }
        self.cursor -= 1;
        self.buffer.remove(self.cursor);
        self.refresh()
    }

    fn delete(&mut self) -> io::Result<()> {
        if self.cursor >= self.buffer.len() {
            return Ok(());
        }
        self.buffer.remove(self.cursor);
        self.refresh()
    }

    fn move_to(&mut self, cursor: usize) -> io::Result<()> {
        self.cursor = cursor.min(self.buffer.len());
        self.refresh()
    }

    fn kill_to_start(&mut self) -> io::Result<()> {
        self.buffer.drain(..self.cursor);
        self.cursor = 0;
        self.refresh()
    }

    fn kill_to_end(&mut self) -> io::Result<()> {
        self.buffer.truncate(self.cursor);
        self.refresh()
    }

    fn delete_word(&mut self) -> io::Result<()> {
        let mut start = self.cursor;
        while start > 0 && self.buffer[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !self.buffer[start - 1].is_whitespace() {
            start -= 1;
        }
        self.buffer.drain(start..self.cursor);
        self.cursor = start;
        self.refresh()
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.cursor_row = 0;
        self.refresh()
    }
}

impl<W: Write> TerminalDriver for Terminal<W> {
    fn buffer(&self) -> &[char] {
        &self.buffer
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn insert(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        let count = chars.len();
        self.buffer.splice(self.cursor..self.cursor, chars);
        self.cursor += count;
    }

    fn width(&self) -> u16 {
        self.width
    }

    fn lines_below_cursor(&self) -> u16 {
        let (cursor_row, _) = self.position(self.cursor);
        let (end_row, _) = self.position(self.buffer.len());
        end_row.saturating_sub(cursor_row) + 1
    }

    fn cursor_column(&self) -> u16 {
        self.position(self.cursor).1
    }

    fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        self.out.flush()
    }

    fn refresh(&mut self) -> io::Result<()> {
        let (cursor_row, cursor_col) = self.position(self.cursor);
        let (end_row, end_col) = self.position(self.buffer.len());
        let prompt = self.prompt.render();
        let line: String = self.buffer.iter().collect();
        let previous_row = self.cursor_row;

        if previous_row > 0 {
            queue!(self.out, MoveUp(previous_row))?;
        }
        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::FromCursorDown),
            Print(prompt),
            Print(line)
        )?;
        // A full last row leaves the cursor in the pending-wrap column
        if end_col == 0 && end_row > 0 {
            queue!(self.out, Print("\r\n"))?;
        }
        if end_row > cursor_row {
            queue!(self.out, MoveUp(end_row - cursor_row))?;
        }
        queue!(self.out, MoveToColumn(cursor_col))?;

        self.cursor_row = cursor_row;
        self.out.flush()
    }
}

/// Restores cooked mode when dropped
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("Failed to leave raw mode: {}", e);
        }
    }
}

/// Interactive line editor with tab completion and history
#[derive(Debug)]
pub struct LineEditor<W: Write> {
    term: Terminal<W>,
    /// None when completion is disabled
    session: Option<CompletionSession>,
    dispatcher: KeyDispatcher,
    history: ShellHistory,
}

impl LineEditor<io::Stdout> {
    /// Create an editor on standard output
    ///
    /// # Arguments
    /// * `tree` - Completion vocabulary, or None to disable completion
    /// * `history` - Command history
    ///
    /// # Returns
    /// * `io::Result<Self>` - Editor or error when the size is unavailable
    pub fn stdout(tree: Option<CompletionTree>, history: ShellHistory) -> io::Result<Self> {
        let (width, _) = terminal::size()?;
        Ok(Self::new(io::stdout(), width, tree, history))
    }

    /// Read one line from the terminal
    ///
    /// # Arguments
    /// * `prompt` - Prompt drawn before the buffer
    ///
    /// # Returns
    /// * `io::Result<ReadOutcome>` - Submitted line, interrupt or end of input
    pub fn read_line(&mut self, prompt: ShellPrompt) -> io::Result<ReadOutcome> {
        let _raw = RawMode::enable()?;
        if let Ok((width, _)) = terminal::size() {
            self.term.set_width(width);
        }
        self.begin(prompt)?;

        loop {
            let event = event::read()?;
            if let Some(outcome) = self.handle_event(event)? {
                return Ok(outcome);
            }
        }
    }
}

impl<W: Write> LineEditor<W> {
    /// Create an editor writing to `out`
    ///
    /// # Arguments
    /// * `out` - Output stream
    /// * `width` - Terminal width in columns
    /// * `tree` - Completion vocabulary, or None to disable completion
    /// * `history` - Command history
    pub fn new(out: W, width: u16, tree: Option<CompletionTree>, history: ShellHistory) -> Self {
        Self {
            term: Terminal::new(out, width),
            session: tree.map(CompletionSession::new),
            dispatcher: KeyDispatcher::new(),
            history,
        }
    }

    /// Terminal state, mainly for inspection
    pub fn terminal(&self) -> &Terminal<W> {
        &self.term
    }

    /// Command history
    pub fn history(&self) -> &ShellHistory {
        &self.history
    }

    /// Start a new line after `prompt`
    pub fn begin(&mut self, prompt: ShellPrompt) -> io::Result<()> {
        self.history.reset();
        self.term.begin(prompt)
    }

    /// Process one terminal event
    ///
    /// # Arguments
    /// * `event` - Event read from the terminal
    ///
    /// # Returns
    /// * `io::Result<Option<ReadOutcome>>` - Some when reading the line is over
    pub fn handle_event(&mut self, event: Event) -> io::Result<Option<ReadOutcome>> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Resize(width, _) => {
                debug!("terminal resized to {} columns", width);
                self.term.set_width(width);
                self.term.refresh()?;
                if let Some(session) = self.session.as_mut() {
                    session.on_resize(&mut self.term)?;
                }
                Ok(None)
            }
            Event::Paste(text) => {
                if let Some(session) = self.session.as_mut() {
                    session.leave(&mut self.term)?;
                }
                let text: String = text.chars().filter(|c| !c.is_control()).collect();
                self.term.insert(&text);
                self.term.refresh()?;
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn handle_key(&mut self, event: KeyEvent) -> io::Result<Option<ReadOutcome>> {
        if let Some(session) = self.session.as_mut() {
            let key = Key::from(&event);
            if self.dispatcher.dispatch(session, &mut self.term, key)? == Dispatch::Consumed {
                return Ok(None);
            }
        }
        self.edit(event)
    }

    fn edit(&mut self, event: KeyEvent) -> io::Result<Option<ReadOutcome>> {
        trace!("editing with {:?}", event);
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let alt = event.modifiers.contains(KeyModifiers::ALT);

        match event.code {
            KeyCode::Enter => return self.submit().map(Some),
            KeyCode::Char('j' | 'm') if ctrl => return self.submit().map(Some),
            KeyCode::Char('c') if ctrl => {
                queue!(self.term.out, Print("^C"))?;
                self.term.finish()?;
                return Ok(Some(ReadOutcome::Interrupted));
            }
            KeyCode::Char('d') if ctrl => {
                if self.term.buffer.is_empty() {
                    self.term.finish()?;
                    return Ok(Some(ReadOutcome::Eof));
                }
                self.term.delete()?;
            }
            KeyCode::Char('a') if ctrl => self.term.move_to(0)?,
            KeyCode::Home => self.term.move_to(0)?,
            KeyCode::Char('e') if ctrl => self.term.move_to(self.term.buffer.len())?,
            KeyCode::End => self.term.move_to(self.term.buffer.len())?,
            KeyCode::Char('b') if ctrl => self.term.move_to(self.term.cursor.saturating_sub(1))?,
            KeyCode::Left => self.term.move_to(self.term.cursor.saturating_sub(1))?,
            KeyCode::Char('f') if ctrl => self.term.move_to(self.term.cursor + 1)?,
            KeyCode::Right => self.term.move_to(self.term.cursor + 1)?,
            KeyCode::Char('p') if ctrl => self.history_previous()?,
            KeyCode::Up => self.history_previous()?,
            KeyCode::Char('n') if ctrl => self.history_next()?,
            KeyCode::Down => self.history_next()?,
            KeyCode::Char('u') if ctrl => self.term.kill_to_start()?,
            KeyCode::Char('k') if ctrl => self.term.kill_to_end()?,
            KeyCode::Char('w') if ctrl => self.term.delete_word()?,
            KeyCode::Char('l') if ctrl => self.term.clear_screen()?,
            KeyCode::Char(_) if ctrl || alt => {}
            KeyCode::Char(c) => self.term.insert_char(c)?,
            KeyCode::Backspace => self.term.backspace()?,
            KeyCode::Delete => self.term.delete()?,
            _ => {}
        }
        Ok(None)
    }

    fn submit(&mut self) -> io::Result<ReadOutcome> {
        self.term.finish()?;
        let line: String = self.term.buffer.iter().collect();

        if let Err(e) = self.history.add(&line) {
            warn!("Failed to record history: {}", e);
        }
        Ok(ReadOutcome::Line(line))
    }

    fn history_previous(&mut self) -> io::Result<()> {
        let current: String = self.term.buffer.iter().collect();
        match self.history.previous(&current) {
            Some(line) => self.term.set_line(&line),
            None => Ok(()),
        }
    }

    fn history_next(&mut self) -> io::Result<()> {
        match self.history.next() {
            Some(line) => self.term.set_line(&line),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::completion::test_support::create_test_tree;

    fn create_test_history() -> ShellHistory {
        ShellHistory::in_memory(100).unwrap()
    }

    fn create_test_editor(width: u16) -> LineEditor<Vec<u8>> {
        let mut editor = LineEditor::new(
            Vec::new(),
            width,
            Some(create_test_tree()),
            create_test_history(),
        );
        editor.begin(ShellPrompt::new("t", "/", false)).unwrap();
        editor
    }

    fn press(editor: &mut LineEditor<Vec<u8>>, code: KeyCode) -> Option<ReadOutcome> {
        editor
            .handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .unwrap()
    }

    fn ctrl(editor: &mut LineEditor<Vec<u8>>, c: char) -> Option<ReadOutcome> {
        editor
            .handle_event(Event::Key(KeyEvent::new(
                KeyCode::Char(c),
                KeyModifiers::CONTROL,
            )))
            .unwrap()
    }

    fn type_text(editor: &mut LineEditor<Vec<u8>>, text: &str) {
        for c in text.chars() {
            assert_eq!(press(editor, KeyCode::Char(c)), None);
        }
    }

    fn line(editor: &LineEditor<Vec<u8>>) -> String {
        editor.terminal().line()
    }

    #[test]
    fn test_type_and_submit() {
        let mut editor = create_test_editor(80);
        type_text(&mut editor, "pwd");
        assert_eq!(
            press(&mut editor, KeyCode::Enter),
            Some(ReadOutcome::Line("pwd".to_string()))
        );
        assert_eq!(editor.history().entries(), vec!["pwd".to_string()]);
    }

    #[test]
    fn test_prompt_is_drawn() {
        let editor = create_test_editor(80);
        let output = String::from_utf8_lossy(editor.terminal().output()).into_owned();
        assert!(output.contains("t:/> "));
    }

    #[test]
    fn test_editing_keys() {
        let mut editor = create_test_editor(80);
        type_text(&mut editor, "lss");
        press(&mut editor, KeyCode::Backspace);
        assert_eq!(line(&editor), "ls");

        press(&mut editor, KeyCode::Home);
        type_text(&mut editor, "x");
        assert_eq!(line(&editor), "xls");
        press(&mut editor, KeyCode::Delete);
        assert_eq!(line(&editor), "xs");

        ctrl(&mut editor, 'e');
        type_text(&mut editor, " a b");
        ctrl(&mut editor, 'w');
        assert_eq!(line(&editor), "xs a ");
        ctrl(&mut editor, 'u');
        assert_eq!(line(&editor), "");
    }

    #[test]
    fn test_tab_completes_through_dispatcher() {
        let mut editor = create_test_editor(80);
        type_text(&mut editor, "ra");
        assert_eq!(press(&mut editor, KeyCode::Tab), None);
        assert_eq!(line(&editor), "racks/");
    }

    #[test]
    fn test_select_and_confirm_does_not_submit() {
        let mut editor = create_test_editor(80);
        type_text(&mut editor, "r");
        press(&mut editor, KeyCode::Tab);
        press(&mut editor, KeyCode::Tab);
        press(&mut editor, KeyCode::Right);

        assert_eq!(press(&mut editor, KeyCode::Enter), None);
        assert_eq!(line(&editor), "rooms/");
        assert_eq!(
            press(&mut editor, KeyCode::Enter),
            Some(ReadOutcome::Line("rooms/".to_string()))
        );
    }

    #[test]
    fn test_typing_while_listing_keeps_the_key() {
        let mut editor = create_test_editor(80);
        type_text(&mut editor, "r");
        press(&mut editor, KeyCode::Tab);
        type_text(&mut editor, "o");
        assert_eq!(line(&editor), "ro");
    }

    #[test]
    fn test_interrupt_and_eof() {
        let mut editor = create_test_editor(80);
        type_text(&mut editor, "cd");
        assert_eq!(ctrl(&mut editor, 'c'), Some(ReadOutcome::Interrupted));

        editor.begin(ShellPrompt::new("t", "/", false)).unwrap();
        assert_eq!(ctrl(&mut editor, 'd'), Some(ReadOutcome::Eof));
    }

    #[test]
    fn test_ctrl_c_closes_listing_first() {
        let mut editor = create_test_editor(80);
        type_text(&mut editor, "r");
        press(&mut editor, KeyCode::Tab);
        assert_eq!(ctrl(&mut editor, 'c'), None);
        assert_eq!(line(&editor), "r");
        assert_eq!(ctrl(&mut editor, 'c'), Some(ReadOutcome::Interrupted));
    }

    #[test]
    fn test_history_navigation() {
        let mut editor = create_test_editor(80);
        type_text(&mut editor, "ls");
        press(&mut editor, KeyCode::Enter);
        editor.begin(ShellPrompt::new("t", "/", false)).unwrap();
        type_text(&mut editor, "pwd");
        press(&mut editor, KeyCode::Enter);

        editor.begin(ShellPrompt::new("t", "/", false)).unwrap();
        type_text(&mut editor, "c");
        press(&mut editor, KeyCode::Up);
        assert_eq!(line(&editor), "pwd");
        press(&mut editor, KeyCode::Up);
        assert_eq!(line(&editor), "ls");
        press(&mut editor, KeyCode::Up);
        assert_eq!(line(&editor), "ls");
        press(&mut editor, KeyCode::Down);
        assert_eq!(line(&editor), "pwd");
        press(&mut editor, KeyCode::Down);
        assert_eq!(line(&editor), "c");
    }

    #[test]
    fn test_history_survives_new_editor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");

        {
            let history = ShellHistory::with_file(100, &path).unwrap();
            let mut editor = LineEditor::new(Vec::new(), 80, None, history);
            editor.begin(ShellPrompt::new("t", "/", false)).unwrap();
            type_text(&mut editor, "pwd");
            press(&mut editor, KeyCode::Enter);
        }

        let history = ShellHistory::with_file(100, &path).unwrap();
        let mut editor = LineEditor::new(Vec::new(), 80, None, history);
        editor.begin(ShellPrompt::new("t", "/", false)).unwrap();
        press(&mut editor, KeyCode::Up);
        assert_eq!(line(&editor), "pwd");
    }

    #[test]
    fn test_geometry_with_wrapping() {
        let mut editor = create_test_editor(10);
        // Prompt "t:/> " is 5 columns wide
        type_text(&mut editor, "abcdefghijkl");
        let term = editor.terminal();
        assert_eq!(term.cursor_column(), 7);
        assert_eq!(term.lines_below_cursor(), 1);

        press(&mut editor, KeyCode::Home);
        let term = editor.terminal();
        assert_eq!(term.cursor_column(), 5);
        assert_eq!(term.lines_below_cursor(), 2);
    }

    #[test]
    fn test_resize_updates_width() {
        let mut editor = create_test_editor(80);
        editor.handle_event(Event::Resize(40, 20)).unwrap();
        assert_eq!(editor.terminal().width(), 40);
    }

    #[test]
    fn test_completion_disabled() {
        let mut editor = LineEditor::new(Vec::new(), 80, None, create_test_history());
        editor.begin(ShellPrompt::new("t", "/", false)).unwrap();
        type_text(&mut editor, "ra");
        press(&mut editor, KeyCode::Tab);
        assert_eq!(line(&editor), "ra");
    }

    #[test]
    fn test_paste_inserts_text() {
        let mut editor = create_test_editor(80);
        editor
            .handle_event(Event::Paste("cd SiteA\n".to_string()))
            .unwrap();
        assert_eq!(line(&editor), "cd SiteA");
    }
}
