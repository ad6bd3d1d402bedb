//! Test doubles for the completion engine

use std::io;

use super::driver::TerminalDriver;
use super::tree::{CompletionNode, CompletionTree};

/// In-memory terminal recording everything the session does to it.
#[derive(Debug, Clone)]
pub struct FakeTerminal {
    pub buffer: Vec<char>,
    pub cursor: usize,
    pub width: u16,
    pub lines_below: u16,
    pub column: u16,
    pub written: Vec<u8>,
    pub inserts: Vec<String>,
    pub refreshes: usize,
}

impl FakeTerminal {
    /// Terminal holding `line` with the cursor at its end
    pub fn with_line(line: &str) -> Self {
        let buffer: Vec<char> = line.chars().collect();
        Self {
            cursor: buffer.len(),
            column: u16::try_from(buffer.len() + 2).unwrap_or(u16::MAX),
            buffer,
            width: 80,
            lines_below: 1,
            written: Vec::new(),
            inserts: Vec::new(),
            refreshes: 0,
        }
    }

    /// Replace the buffer, cursor at the end
    pub fn set_line(&mut self, line: &str) {
        self.buffer = line.chars().collect();
        self.cursor = self.buffer.len();
    }

    /// Raw output as text
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }

    /// Forget recorded output
    pub fn clear_output(&mut self) {
        self.written.clear();
    }
}

impl TerminalDriver for FakeTerminal {
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
        self.inserts.push(text.to_string());
    }

    fn width(&self) -> u16 {
        self.width
    }

    fn lines_below_cursor(&self) -> u16 {
        self.lines_below
    }

    fn cursor_column(&self) -> u16 {
        self.column
    }

    fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.refreshes += 1;
        Ok(())
    }
}

/// Tree with `racks/<dynamic>` and `rooms/`
pub fn create_test_tree() -> CompletionTree {
    CompletionTree::new([
        CompletionNode::literal("racks").hierarchical().child(CompletionNode::dynamic(
            |_: &str| -> Vec<String> {
                vec!["A01".to_string(), "A02".to_string(), "B01".to_string()]
            },
        )),
        CompletionNode::literal("rooms").hierarchical(),
        CompletionNode::literal("exit"),
    ])
}
