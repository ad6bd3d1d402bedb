//! REPL (Read-Eval-Print Loop) engine for treeline
//!
//! This module provides the interactive shell:
//! - A crossterm line editor with history kept in a file between sessions
//! - Tab completion of commands and catalog paths
//! - A prompt showing the current catalog path
//!
//! When standard input is not a terminal the same commands are read line by
//! line without the editor.

pub mod completion;
mod editor;
mod history;
mod prompt;
mod shared_state;

pub use editor::{LineEditor, ReadOutcome, Terminal};
pub use history::ShellHistory;
pub use prompt::ShellPrompt;
pub use shared_state::SharedState;

use std::io::{self, BufRead, Write};

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use nu_ansi_term::Color;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::executor::{Executor, ResultData};

/// REPL engine for interactive command execution
pub struct ReplEngine {
    /// Line editor for command input
    editor: LineEditor<io::Stdout>,

    /// Shared state with the completion resolvers
    shared_state: SharedState,

    /// Command executor
    executor: Executor,

    /// Label shown in the prompt
    prompt_label: String,

    /// Whether to continue running
    running: bool,
}

impl ReplEngine {
    /// Create a new REPL engine with shared state
    ///
    /// # Arguments
    /// * `shared_state` - Shared state with the catalog
    /// * `config` - Effective configuration
    ///
    /// # Returns
    /// * `Result<Self>` - New REPL engine or error
    pub fn new(shared_state: SharedState, config: &Config) -> Result<Self> {
        let tree = config
            .completion
            .enabled
            .then(|| completion::shell_tree(&shared_state));
        if let Some(tree) = &tree {
            debug!("Completion tree has {} nodes", completion::node_count(tree));
        }
        let history = ShellHistory::from_config(&config.history)?;
        let editor = LineEditor::stdout(tree, history)?;

        Ok(Self {
            editor,
            executor: Executor::new(shared_state.clone()),
            shared_state,
            prompt_label: config.display.prompt_label.clone(),
            running: true,
        })
    }

    /// Run until `exit` or end of input
    ///
    /// # Returns
    /// * `Result<()>` - Error only for terminal failures
    pub fn run(&mut self) -> Result<()> {
        info!("Starting interactive shell");

        while self.running {
            let prompt = self.prompt();
            match self.editor.read_line(prompt)? {
                ReadOutcome::Line(line) => self.process_line(&line)?,
                ReadOutcome::Interrupted => continue,
                ReadOutcome::Eof => self.running = false,
            }
        }

        debug!("Interactive shell stopped");
        Ok(())
    }

    /// Check if REPL is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    fn prompt(&self) -> ShellPrompt {
        ShellPrompt::new(
            self.prompt_label.as_str(),
            self.shared_state.current_path(),
            self.shared_state.color_enabled(),
        )
    }

    fn process_line(&mut self, line: &str) -> Result<()> {
        let mut stdout = io::stdout();

        match self.executor.execute_line(line) {
            Ok(ResultData::Exit) => self.running = false,
            Ok(ResultData::ClearScreen) => {
                execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
            }
            Ok(data) => {
                if let Some(text) = format_output(&data) {
                    writeln!(stdout, "{}", text)?;
                }
            }
            Err(e) => {
                let message = e.to_string();
                if self.shared_state.color_enabled() {
                    eprintln!("{}", Color::Red.paint(message));
                } else {
                    eprintln!("{}", message);
                }
            }
        }
        Ok(())
    }
}

/// Text printed for a command result
///
/// # Arguments
/// * `data` - Command result
///
/// # Returns
/// * `Option<String>` - Text to print, None when there is nothing to show
pub fn format_output(data: &ResultData) -> Option<String> {
    match data {
        ResultData::Message(text) if !text.is_empty() => Some(text.clone()),
        ResultData::List(items) if !items.is_empty() => Some(items.join("\n")),
        _ => None,
    }
}

/// Execute commands read from a non-interactive input
///
/// Every line is executed even after a failure; errors are written to `err`
/// prefixed with their line number.
///
/// # Arguments
/// * `executor` - Command executor
/// * `input` - Command source
/// * `out` - Destination for command output
/// * `err` - Destination for error messages
///
/// # Returns
/// * `Result<usize>` - Number of failed lines
pub fn run_batch<R: BufRead, W: Write, E: Write>(
    executor: &Executor,
    input: R,
    out: &mut W,
    err: &mut E,
) -> Result<usize> {
    let mut failures = 0;

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        match executor.execute_line(&line) {
            Ok(ResultData::Exit) => break,
            Ok(data) => {
                if let Some(text) = format_output(&data) {
                    writeln!(out, "{}", text)?;
                }
            }
            Err(e) => {
                failures += 1;
                writeln!(err, "line {}: {}", index + 1, e)?;
            }
        }
    }

    out.flush()?;
    Ok(failures)
}
