//! Treeline - hierarchical catalog shell
//!
//! Navigate a catalog of sites, buildings, rooms and racks with `cd`, `ls`
//! and `tree`, completing commands and paths with Tab.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode
//! treeline --catalog demos/catalog.toml
//!
//! # Non-interactive mode
//! echo "tree / 2" | treeline --catalog demos/catalog.toml
//!
//! # Ask the completion engine directly
//! treeline --catalog demos/catalog.toml complete "cd SiteA/" --json
//! ```

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use treeline::cli::CliInterface;
use treeline::config::LoggingConfig;
use treeline::error::{Result, ShellError};
use treeline::executor::Executor;
use treeline::repl::{self, ReplEngine};

/// Application entry point
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// This function orchestrates the application startup:
/// 1. Parse command-line arguments
/// 2. Load configuration
/// 3. Initialize logging
/// 4. Handle subcommands or start the shell
///
/// # Returns
/// * `Result<()>` - Success or error
fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli.config().logging)?;

    if cli.handle_subcommand()? {
        return Ok(());
    }

    let shared_state = cli.shared_state()?;

    if io::stdin().is_terminal() {
        cli.print_banner(&shared_state);
        let mut engine = ReplEngine::new(shared_state, cli.config())?;
        engine.run()?;
        if !cli.args().quiet {
            println!("Goodbye!");
        }
        return Ok(());
    }

    let executor = Executor::new(shared_state);
    let failures = repl::run_batch(
        &executor,
        io::stdin().lock(),
        &mut io::stdout(),
        &mut io::stderr(),
    )?;
    if failures > 0 {
        return Err(ShellError::Generic(format!("{} command(s) failed", failures)));
    }
    Ok(())
}

/// Initialize logging from the effective configuration
///
/// `RUST_LOG` takes precedence over the configured level. With a log file
/// configured, output goes there without colors so the editor's screen is
/// left alone.
///
/// # Arguments
/// * `config` - Logging configuration after CLI overrides
fn initialize_logging(config: &LoggingConfig) -> Result<()> {
    let level = config.level.to_tracing_level();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let (writer, ansi) = match &config.file_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(io::stderr), true),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer);

    if config.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
    Ok(())
}
