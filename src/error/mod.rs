//! Error handling for the shell.
//!
//! The completion engine itself never fails: a completion that cannot be
//! computed degrades to "no candidates". The types here cover everything
//! around it: configuration loading, the object catalog, command parsing and
//! terminal I/O.
//!
//! # Example
//!
//! ```rust,no_run
//! use treeline::error::{CatalogError, Result};
//!
//! fn lookup(path: &str) -> Result<()> {
//!     Err(CatalogError::NotFound(path.to_string()).into())
//! }
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{CatalogError, ConfigError, ParseError, Result, ShellError};
