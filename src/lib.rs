//! Treeline Library
//!
//! Tree-driven tab completion for interactive shells, together with the
//! hierarchical catalog shell built on it.
//!
//! # Modules
//!
//! - `catalog`: In-memory object hierarchy the shell navigates
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `executor`: Command execution against the catalog
//! - `parser`: Shell command parsing
//! - `repl`: Line editor, completion engine and the interactive loop
//!
//! # Example
//!
//! ```no_run
//! use treeline::repl::completion::{CompletionNode, CompletionTree, PathMatcher};
//!
//! let tree = CompletionTree::new([
//!     CompletionNode::literal("racks")
//!         .hierarchical()
//!         .child(CompletionNode::dynamic(|_: &str| vec!["A01".to_string(), "A02".to_string()])),
//!     CompletionNode::literal("rooms").hierarchical(),
//! ]);
//!
//! let result = PathMatcher::new(&tree).complete("racks/A", 7);
//! assert_eq!(result.common_prefix(), "0");
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod parser;
pub mod repl;

// Re-export commonly used types
pub use catalog::Catalog;
pub use config::Config;
pub use error::{Result, ShellError};
pub use executor::{Executor, ResultData};
pub use parser::{Command, Parser};
pub use repl::{ReplEngine, SharedState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
