//! Command-line interface for treeline
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Catalog loading
//! - One-shot subcommands (completion scripts, config checks, `complete`)

mod completion;

pub use completion::{completion_script, generate_completion};

use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::config::{Config, LogLevel};
use crate::error::Result;
use crate::repl::SharedState;
use crate::repl::completion::{MatchResult, PathMatcher, node_count, shell_tree};

/// Hierarchical catalog shell with tree-driven tab completion
#[derive(Parser, Debug)]
#[command(
    name = "treeline",
    version,
    about = "Hierarchical catalog shell with tab completion",
    long_about = "An interactive shell for navigating a hierarchical object catalog.
Tab completes commands and catalog paths; a second Tab lets you pick a
candidate from a grid with the arrow keys."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Catalog file to load
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Disable tab completion
    #[arg(long = "no-completion")]
    pub no_completion: bool,

    /// Do not read or write the history file
    #[arg(long = "no-history")]
    pub no_history: bool,

    /// Quiet mode (minimal output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for treeline
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Print the completion candidates for a command line
    Complete {
        /// Command line to complete
        #[arg(value_name = "LINE")]
        line: String,

        /// Cursor position in characters (defaults to the end of the line)
        #[arg(long, value_name = "POS")]
        cursor: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the completion tree
    Tree,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    /// Get the effective configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_display_args(config, args);
        Self::apply_logging_args(config, args);

        if let Some(path) = &args.catalog {
            config.catalog.file_path = Some(path.clone());
        }
        if args.no_completion {
            config.completion.enabled = false;
        }
        if args.no_history {
            config.history.persist = false;
        }
    }

    /// Apply display-related CLI arguments to configuration
    fn apply_display_args(config: &mut Config, args: &CliArgs) {
        if args.no_color {
            config.display.color_output = false;
        }
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Load the configured catalog, or an empty one
    ///
    /// # Returns
    /// * `Result<Catalog>` - Loaded catalog or error
    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.config.catalog.file_path {
            Some(path) => Ok(Catalog::load_from_file(path)?),
            None => Ok(Catalog::new()),
        }
    }

    /// Build the shell state from the configured catalog
    pub fn shared_state(&self) -> Result<SharedState> {
        Ok(SharedState::with_config(
            self.load_catalog()?,
            &self.config.display,
        ))
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                generate_completion(shell)?;
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            Some(Commands::Complete { line, cursor, json }) => {
                let state = self.shared_state()?;
                let tree = shell_tree(&state);
                let cursor = cursor.unwrap_or_else(|| line.chars().count());
                let result = PathMatcher::new(&tree).complete(line, cursor);
                println!("{}", format_candidates(&result, *json)?);
                Ok(true)
            }
            Some(Commands::Tree) => {
                let tree = shell_tree(&self.shared_state()?);
                print!("{}", tree);
                if !self.args.quiet {
                    println!("{} nodes", node_count(&tree));
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Show version information
    fn show_version(&self) {
        println!("treeline version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file()?;
        }

        if show {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("❌ Configuration file does not exist");
            return Ok(());
        }

        match Config::load_from_file(Some(&path)) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("✅ Configuration is valid"),
                Err(e) => println!("❌ Configuration validation failed: {}", e),
            },
            Err(e) => println!("❌ Failed to load configuration: {}", e),
        }

        Ok(())
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("=== Effective Configuration ===");
        println!();

        match self.config.to_toml_string() {
            Ok(toml_str) => println!("{}", toml_str),
            Err(e) => {
                eprintln!("Error formatting configuration: {}", e);
                println!("{:#?}", self.config);
            }
        }

        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_config_path)
    }

    /// Print a one-line banner unless quiet
    pub fn print_banner(&self, state: &SharedState) {
        if !self.args.quiet {
            let objects = state.with_catalog(|catalog| catalog.len());
            println!(
                "treeline {} ({} catalog objects, type 'help' for commands)",
                env!("CARGO_PKG_VERSION"),
                objects
            );
        }
    }
}

/// Format a match result for the `complete` subcommand
///
/// Plain output has one full insertion per line; JSON output carries the
/// offset and every candidate.
///
/// # Arguments
/// * `result` - Matcher output
/// * `as_json` - Whether to emit JSON
///
/// # Returns
/// * `Result<String>` - Formatted result or error
pub fn format_candidates(result: &MatchResult, as_json: bool) -> Result<String> {
    if !as_json {
        return Ok(result
            .candidates
            .iter()
            .map(|c| c.insertion())
            .collect::<Vec<_>>()
            .join("\n"));
    }

    let candidates: Vec<_> = result
        .candidates
        .iter()
        .map(|c| {
            json!({
                "suffix": c.suffix,
                "has_children": c.has_children,
                "insertion": c.insertion(),
            })
        })
        .collect();
    let value = json!({
        "offset": result.offset,
        "common_prefix": result.common_prefix(),
        "candidates": candidates,
    });

    serde_json::to_string_pretty(&value).map_err(|e| e.to_string().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::completion::Candidate;
    use std::io::Write;

    #[test]
    fn test_cli_args_parsing() {
        let args = CliArgs::try_parse_from(vec!["treeline"]).unwrap();
        assert!(args.config_file.is_none());
        assert!(args.catalog.is_none());
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_args_with_flags() {
        let args =
            CliArgs::try_parse_from(vec!["treeline", "--no-color", "-v", "--catalog", "dc.toml"])
                .unwrap();
        assert!(args.no_color);
        assert!(args.verbose);
        assert_eq!(args.catalog, Some(PathBuf::from("dc.toml")));
    }

    #[test]
    fn test_complete_subcommand_parsing() {
        let args = CliArgs::try_parse_from(vec!["treeline", "complete", "cd Si", "--json"]).unwrap();
        match args.command {
            Some(Commands::Complete { line, cursor, json }) => {
                assert_eq!(line, "cd Si");
                assert_eq!(cursor, None);
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_args_override_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"info\"\n[completion]\nenabled = true").unwrap();
        let config_path = file.path().to_str().unwrap().to_string();

        let args = CliArgs::try_parse_from(vec![
            "treeline",
            "-c",
            config_path.as_str(),
            "-q",
            "--no-completion",
            "--no-color",
            "--no-history",
        ])
        .unwrap();
        let cli = CliInterface::from_args(args).unwrap();

        assert_eq!(cli.config().logging.level, LogLevel::Error);
        assert!(!cli.config().completion.enabled);
        assert!(!cli.config().display.color_output);
        assert!(!cli.config().history.persist);
    }

    #[test]
    fn test_load_catalog_from_flag() {
        let dir = tempfile::tempdir().unwrap();
        let catalog_path = dir.path().join("catalog.toml");
        std::fs::write(
            &catalog_path,
            "[[objects]]\npath = \"SiteA\"\ncategory = \"site\"\n",
        )
        .unwrap();
        let missing_config = dir.path().join("none.toml");

        let args = CliArgs::try_parse_from(vec![
            "treeline".to_string(),
            "-c".to_string(),
            missing_config.display().to_string(),
            "--catalog".to_string(),
            catalog_path.display().to_string(),
        ])
        .unwrap();
        let cli = CliInterface::from_args(args).unwrap();

        let state = cli.shared_state().unwrap();
        assert_eq!(state.with_catalog(|c| c.len()), 1);
    }

    #[test]
    fn test_format_candidates() {
        let result = MatchResult {
            candidates: vec![Candidate::new("A", true), Candidate::new("B", false)],
            offset: 4,
        };

        assert_eq!(format_candidates(&result, false).unwrap(), "A/\nB ");

        let text = format_candidates(&result, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["offset"], 4);
        assert_eq!(value["candidates"][0]["insertion"], "A/");
        assert_eq!(value["candidates"][1]["has_children"], false);
    }
}
