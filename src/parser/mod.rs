//! Shell command parser
//!
//! Commands are single lines of whitespace-separated words:
//!
//! - `cd [path]`, `ls [-r] [path]`, `tree [path] [depth]`, `pwd`
//! - `man [command]`, `help`, `clear`, `exit`
//! - `.cmds: <file>` runs the commands stored in a file
//!
//! No quoting or escaping is supported; catalog names never contain spaces.

use std::path::PathBuf;

use crate::error::{ParseError, Result};

/// Commands known to the shell, in help order
pub const COMMAND_NAMES: &[&str] = &[
    "cd", "ls", "tree", "pwd", "man", "help", "clear", ".cmds", "exit",
];

/// Depth used by `tree` when none is given
pub const DEFAULT_TREE_DEPTH: usize = 3;

const SCRIPT_PREFIX: &str = ".cmds:";

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Change the current path; None goes to the root
    Cd(Option<String>),
    /// List the children of a path
    Ls {
        path: Option<String>,
        recursive: bool,
    },
    /// Print the subtree below a path
    Tree { path: Option<String>, depth: usize },
    /// Print the current path
    Pwd,
    /// Show the manual of a command, or the list of manuals
    Man(Option<String>),
    /// Show command overview
    Help,
    /// Clear the screen
    Clear,
    /// Run commands from a file
    RunScript(PathBuf),
    /// Leave the shell
    Exit,
}

/// Parser for shell commands
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser;

impl Parser {
    /// Create a new parser instance
    pub fn new() -> Self {
        Self
    }

    /// Parse an input line into a Command
    ///
    /// # Arguments
    /// * `input` - The input line
    ///
    /// # Returns
    /// * `Result<Command>` - The parsed command or an error
    pub fn parse(&self, input: &str) -> Result<Command> {
        let trimmed = input.trim();

        if let Some(rest) = trimmed.strip_prefix(SCRIPT_PREFIX) {
            return Self::parse_script(rest.trim());
        }

        let mut words = trimmed.split_whitespace();
        let Some(name) = words.next() else {
            return Err(ParseError::UnknownCommand(String::new()).into());
        };
        let args: Vec<&str> = words.collect();

        match name {
            "cd" => {
                let path = Self::at_most_one(name, &args)?;
                Ok(Command::Cd(path))
            }
            "ls" => Self::parse_ls(&args),
            "tree" => Self::parse_tree(&args),
            "man" => {
                let topic = Self::at_most_one(name, &args)?;
                Ok(Command::Man(topic))
            }
            "pwd" => Self::no_args(name, &args, Command::Pwd),
            "help" => Self::no_args(name, &args, Command::Help),
            "clear" => Self::no_args(name, &args, Command::Clear),
            "exit" | "quit" => Self::no_args(name, &args, Command::Exit),
            other => Err(ParseError::UnknownCommand(other.to_string()).into()),
        }
    }

    fn parse_script(rest: &str) -> Result<Command> {
        if rest.is_empty() {
            return Err(ParseError::MissingArgument {
                command: SCRIPT_PREFIX.to_string(),
                argument: "file".to_string(),
            }
            .into());
        }
        Ok(Command::RunScript(PathBuf::from(rest)))
    }

    fn parse_ls(args: &[&str]) -> Result<Command> {
        let mut recursive = false;
        let mut path = None;

        for arg in args {
            match *arg {
                "-r" => recursive = true,
                flag if flag.starts_with('-') => {
                    return Err(ParseError::InvalidValue {
                        argument: "option".to_string(),
                        value: flag.to_string(),
                    }
                    .into());
                }
                p if path.is_none() => path = Some(p.to_string()),
                extra => {
                    return Err(ParseError::UnexpectedArgument {
                        command: "ls".to_string(),
                        argument: extra.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(Command::Ls { path, recursive })
    }

    fn parse_tree(args: &[&str]) -> Result<Command> {
        match args {
            [] => Ok(Command::Tree {
                path: None,
                depth: DEFAULT_TREE_DEPTH,
            }),
            [path] => Ok(Command::Tree {
                path: Some(path.to_string()),
                depth: DEFAULT_TREE_DEPTH,
            }),
            [path, depth] => {
                let depth = depth.parse().map_err(|_| ParseError::InvalidValue {
                    argument: "depth".to_string(),
                    value: depth.to_string(),
                })?;
                Ok(Command::Tree {
                    path: Some(path.to_string()),
                    depth,
                })
            }
            [_, _, extra, ..] => Err(ParseError::UnexpectedArgument {
                command: "tree".to_string(),
                argument: extra.to_string(),
            }
            .into()),
        }
    }

    fn at_most_one(command: &str, args: &[&str]) -> Result<Option<String>> {
        match args {
            [] => Ok(None),
            [arg] => Ok(Some(arg.to_string())),
            [_, extra, ..] => Err(ParseError::UnexpectedArgument {
                command: command.to_string(),
                argument: extra.to_string(),
            }
            .into()),
        }
    }

    fn no_args(command: &str, args: &[&str], parsed: Command) -> Result<Command> {
        match args.first() {
            None => Ok(parsed),
            Some(extra) => Err(ParseError::UnexpectedArgument {
                command: command.to_string(),
                argument: extra.to_string(),
            }
            .into()),
        }
    }
}
