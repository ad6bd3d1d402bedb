//! Shell completion scripts for the treeline binary itself
//!
//! These complete the command-line flags and subcommands of `treeline` in the
//! user's login shell. Completion inside the interactive shell is handled by
//! [`crate::repl::completion`].

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::CliArgs;
use crate::error::{ConfigError, Result};

const BIN_NAME: &str = "treeline";

/// Print the completion script for a shell to stdout
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish)
///
/// # Returns
/// * `Result<()>` - Success or error for unsupported shells
pub fn generate_completion(shell_name: &str) -> Result<()> {
    print!("{}", completion_script(shell_name)?);
    Ok(())
}

/// Build the completion script for a shell
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish)
///
/// # Returns
/// * `Result<String>` - Script text or error for unsupported shells
pub fn completion_script(shell_name: &str) -> Result<String> {
    let shell = parse_shell(shell_name)?;

    let mut cmd = CliArgs::command();
    let mut buffer = Vec::new();
    generate(shell, &mut cmd, BIN_NAME, &mut buffer);

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(ConfigError::Generic(format!(
            "Unsupported shell: {}. Supported shells: bash, zsh, fish",
            shell_name
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shell() {
        assert!(matches!(parse_shell("bash"), Ok(Shell::Bash)));
        assert!(matches!(parse_shell("ZSH"), Ok(Shell::Zsh)));
        assert!(matches!(parse_shell("fish"), Ok(Shell::Fish)));
        assert!(parse_shell("cmd").is_err());
    }

    #[test]
    fn test_bash_script_mentions_binary() {
        let script = completion_script("bash").unwrap();
        assert!(script.contains("treeline"));
        assert!(script.contains("--catalog"));
    }
}
