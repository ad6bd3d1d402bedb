//! Prompt shown in front of the line buffer

use nu_ansi_term::{Color, Style};
use unicode_width::UnicodeWidthStr;

/// Prompt for the treeline REPL
#[derive(Debug, Clone)]
pub struct ShellPrompt {
    /// Label before the path
    label: String,
    /// Current catalog path
    path: String,
    /// Whether to color the prompt
    color: bool,
}

impl ShellPrompt {
    /// Create a new prompt
    ///
    /// # Arguments
    /// * `label` - Label before the path
    /// * `path` - Current catalog path
    /// * `color` - Whether to emit ANSI colors
    ///
    /// # Returns
    /// * `Self` - New prompt
    pub fn new(label: impl Into<String>, path: impl Into<String>, color: bool) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            color,
        }
    }

    /// Prompt text without escape codes
    pub fn plain(&self) -> String {
        format!("{}:{}> ", self.label, self.path)
    }

    /// Prompt text as written to the terminal
    pub fn render(&self) -> String {
        if !self.color {
            return self.plain();
        }

        let label: Style = Color::Green.bold();
        let path: Style = Color::Blue.bold();
        format!(
            "{}:{}> ",
            label.paint(self.label.as_str()),
            path.paint(self.path.as_str())
        )
    }

    /// Display width of the prompt in columns
    pub fn width(&self) -> usize {
        self.plain().width()
    }
}
