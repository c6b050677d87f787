//! Error types for the content-select-downloader application.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // Pipeline errors
    #[error("Connection failed: {0}")]
    Connectivity(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Invalid PDF fragment: {0}")]
    Validation(String),

    #[error("Nothing found: {0}")]
    EmptyResult(String),

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // PDF errors
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], used when a failure is collapsed
/// into a job's terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connectivity,
    Extraction,
    Validation,
    EmptyResult,
    Filesystem,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Connectivity => write!(f, "connectivity"),
            ErrorKind::Extraction => write!(f, "extraction"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::EmptyResult => write!(f, "empty result"),
            ErrorKind::Filesystem => write!(f, "filesystem"),
            ErrorKind::Config => write!(f, "config"),
        }
    }
}

impl Error {
    /// Map this error onto the pipeline's failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) | Error::ConfigValidation { .. } | Error::TomlParse(_) => {
                ErrorKind::Config
            }
            Error::Connectivity(_) | Error::Http(_) => ErrorKind::Connectivity,
            Error::Extraction(_) | Error::UrlParse(_) => ErrorKind::Extraction,
            Error::Validation(_) | Error::Pdf(_) => ErrorKind::Validation,
            Error::EmptyResult(_) => ErrorKind::EmptyResult,
            Error::Filesystem { .. } | Error::Io(_) => ErrorKind::Filesystem,
        }
    }

    /// Attach a path to an IO error.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ABORT: i32 = 1;
    pub const CONNECTION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const UNEXPECTED_ERROR: i32 = 5;
    pub const SOME_JOBS_FAILED: i32 = 6;
}
