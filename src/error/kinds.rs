use std::{fmt, io};

/// Crate-wide `Result` type using [`ShellError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Top-level error type for shell operations.
#[derive(Debug)]
pub enum ShellError {
    /// Configuration errors.
    Config(ConfigError),

    /// Object catalog errors.
    Catalog(CatalogError),

    /// Command parsing errors.
    Parse(ParseError),

    /// I/O errors, terminal included.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Anything else, such as an unsupported shell name.
    Generic(String),
}

/// Object catalog errors.
#[derive(Debug)]
pub enum CatalogError {
    /// No object at this path.
    NotFound(String),

    /// An object already exists at this path.
    AlreadyExists(String),

    /// The parent of a new object does not exist.
    MissingParent(String),

    /// Path is empty or contains an empty segment.
    InvalidPath(String),

    /// Catalog file could not be read or parsed.
    InvalidFormat(String),
}

/// Command parsing errors.
#[derive(Debug)]
pub enum ParseError {
    /// First word is not a known command.
    UnknownCommand(String),

    /// A required argument is missing.
    MissingArgument { command: String, argument: String },

    /// More arguments than the command accepts.
    UnexpectedArgument { command: String, argument: String },

    /// An argument has the wrong form.
    InvalidValue { argument: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Config(e) => write!(f, "Configuration error: {e}"),
            ShellError::Catalog(e) => write!(f, "{e}"),
            ShellError::Parse(e) => write!(f, "{e}"),
            ShellError::Io(e) => write!(f, "I/O error: {e}"),
            ShellError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::NotFound(path) => write!(f, "No such object: {path}"),
            CatalogError::AlreadyExists(path) => write!(f, "Object already exists: {path}"),
            CatalogError::MissingParent(path) => {
                write!(f, "Parent of '{path}' does not exist")
            }
            CatalogError::InvalidPath(path) => write!(f, "Invalid path: '{path}'"),
            CatalogError::InvalidFormat(msg) => write!(f, "Invalid catalog: {msg}"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownCommand(cmd) => write!(f, "Unknown command: {cmd}"),
            ParseError::MissingArgument { command, argument } => {
                write!(f, "{command}: missing {argument}")
            }
            ParseError::UnexpectedArgument { command, argument } => {
                write!(f, "{command}: unexpected argument '{argument}'")
            }
            ParseError::InvalidValue { argument, value } => {
                write!(f, "Invalid {argument}: '{value}'")
            }
        }
    }
}

impl std::error::Error for ShellError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for CatalogError {}
impl std::error::Error for ParseError {}

/* ========================= Conversions to ShellError ========================= */

impl From<io::Error> for ShellError {
    fn from(err: io::Error) -> Self {
        ShellError::Io(err)
    }
}

impl From<ConfigError> for ShellError {
    fn from(err: ConfigError) -> Self {
        ShellError::Config(err)
    }
}

impl From<CatalogError> for ShellError {
    fn from(err: CatalogError) -> Self {
        ShellError::Catalog(err)
    }
}

impl From<ParseError> for ShellError {
    fn from(err: ParseError) -> Self {
        ShellError::Parse(err)
    }
}

impl From<reedline::ReedlineError> for ShellError {
    fn from(err: reedline::ReedlineError) -> Self {
        ShellError::Generic(format!("History error: {err}"))
    }
}

impl From<String> for ShellError {
    fn from(msg: String) -> Self {
        ShellError::Generic(msg)
    }
}

impl From<&str> for ShellError {
    fn from(msg: &str) -> Self {
        ShellError::Generic(msg.to_owned())
    }
}
