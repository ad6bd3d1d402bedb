//! Command execution against the object catalog
//!
//! The executor turns parsed [`Command`]s into [`ResultData`], reading and
//! updating the [`SharedState`] that the completion resolvers also see. It
//! performs no terminal I/O; printing and clearing the screen are left to the
//! caller.

mod manual;

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::catalog::{Entity, resolve_path};
use crate::error::{CatalogError, Result, ShellError};
use crate::parser::{Command, Parser};
use crate::repl::SharedState;

/// Nesting limit for `.cmds:` files running other files
const MAX_SCRIPT_DEPTH: usize = 8;

/// Data returned from command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultData {
    /// Text message
    Message(String),

    /// List of names or paths
    List(Vec<String>),

    /// The screen should be cleared
    ClearScreen,

    /// The shell should stop
    Exit,

    /// No data
    None,
}

/// Executes shell commands
#[derive(Debug, Clone)]
pub struct Executor {
    /// Shared shell state
    state: SharedState,

    /// Parser used for script lines
    parser: Parser,
}

impl Executor {
    /// Create a new executor
    ///
    /// # Arguments
    /// * `state` - Shared shell state
    pub fn new(state: SharedState) -> Self {
        Self {
            state,
            parser: Parser::new(),
        }
    }

    /// Shared state this executor works on
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Parse and execute one input line
    ///
    /// # Arguments
    /// * `line` - Raw input line
    ///
    /// # Returns
    /// * `Result<ResultData>` - Command output or error; blank lines give `None`
    pub fn execute_line(&self, line: &str) -> Result<ResultData> {
        self.execute_line_at(line, 0)
    }

    /// Execute a parsed command
    ///
    /// # Arguments
    /// * `command` - Command to execute
    ///
    /// # Returns
    /// * `Result<ResultData>` - Command output or error
    pub fn execute(&self, command: Command) -> Result<ResultData> {
        self.execute_at(command, 0)
    }

    fn execute_line_at(&self, line: &str, nesting: usize) -> Result<ResultData> {
        if line.trim().is_empty() {
            return Ok(ResultData::None);
        }
        let command = self.parser.parse(line)?;
        self.execute_at(command, nesting)
    }

    fn execute_at(&self, command: Command, nesting: usize) -> Result<ResultData> {
        debug!("Executing {:?}", command);

        match command {
            Command::Cd(path) => self.cd(path.as_deref()),
            Command::Ls { path, recursive } => self.ls(path.as_deref(), recursive),
            Command::Tree { path, depth } => self.tree(path.as_deref(), depth),
            Command::Pwd => Ok(ResultData::Message(self.state.current_path())),
            Command::Man(None) => Ok(ResultData::Message(manual::index())),
            Command::Man(Some(topic)) => manual::page(&topic)
                .map(|text| ResultData::Message(text.to_string()))
                .ok_or_else(|| ShellError::Generic(format!("No manual entry for {}", topic))),
            Command::Help => Ok(ResultData::Message(manual::overview())),
            Command::Clear => Ok(ResultData::ClearScreen),
            Command::RunScript(path) => self.run_script(&path, nesting),
            Command::Exit => Ok(ResultData::Exit),
        }
    }

    fn target(&self, path: Option<&str>) -> String {
        resolve_path(&self.state.current_path(), path.unwrap_or("."))
    }

    fn cd(&self, path: Option<&str>) -> Result<ResultData> {
        let target = resolve_path(&self.state.current_path(), path.unwrap_or("/"));
        let exists = self.state.with_catalog(|catalog| catalog.get(&target).is_some());
        if !exists {
            return Err(CatalogError::NotFound(target).into());
        }

        debug!("Changing path to {}", target);
        self.state.set_current_path(target);
        Ok(ResultData::None)
    }

    fn ls(&self, path: Option<&str>, recursive: bool) -> Result<ResultData> {
        let target = self.target(path);
        let names = self.state.with_catalog(|catalog| {
            catalog.ls(&target).map(|children| {
                let mut names = Vec::new();
                if recursive {
                    collect_descendants(children, "", &mut names);
                } else {
                    names.extend(children.iter().map(|e| e.name.clone()));
                }
                names
            })
        })?;
        Ok(ResultData::List(names))
    }

    fn tree(&self, path: Option<&str>, depth: usize) -> Result<ResultData> {
        let target = self.target(path);
        let text = self
            .state
            .with_catalog(|catalog| catalog.tree(&target, depth))?;
        Ok(ResultData::Message(text.trim_end().to_string()))
    }

    fn run_script(&self, path: &Path, nesting: usize) -> Result<ResultData> {
        if nesting >= MAX_SCRIPT_DEPTH {
            return Err(ShellError::Generic(format!(
                "{}: scripts nested deeper than {}",
                path.display(),
                MAX_SCRIPT_DEPTH
            )));
        }

        let content = fs::read_to_string(path)?;
        info!("Running script {}", path.display());

        let mut output = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let data = self.execute_line_at(line, nesting + 1).map_err(|e| {
                ShellError::Generic(format!("{}:{}: {}", path.display(), index + 1, e))
            })?;

            match data {
                ResultData::Message(text) => output.push(text),
                ResultData::List(items) => output.extend(items),
                ResultData::Exit => return Ok(ResultData::Exit),
                ResultData::ClearScreen | ResultData::None => {}
            }
        }

        if output.is_empty() {
            Ok(ResultData::None)
        } else {
            Ok(ResultData::Message(output.join("\n")))
        }
    }
}

fn collect_descendants(entities: &[Entity], prefix: &str, out: &mut Vec<String>) {
    for entity in entities {
        let path = format!("{}{}", prefix, entity.name);
        out.push(path.clone());
        collect_descendants(&entity.children, &format!("{}/", path), out);
    }
}
