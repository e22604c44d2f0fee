//! Error types for gsu-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for gsu-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gsu-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration or credentials file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local path missing, or of the wrong kind for the command
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Rejected user input, such as a non-positive day count
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk error
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication or permission error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Remote object or bucket not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or service error
    #[error("Network error: {0}")]
    Network(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) | Error::InvalidInput(_) => 2, // UsageError
            Error::Config(_) | Error::TomlParse(_) | Error::InvalidUrl(_) => 2,
            Error::Network(_) => 3, // NetworkError
            Error::Auth(_) => 4,    // AuthError
            Error::NotFound(_) => 5,
            Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => 5,
            _ => 1, // GeneralError
        }
    }
}

/// An operation that failed after producing part of its result.
///
/// Listing keeps the names gathered before the failing page, a directory
/// upload keeps the files uploaded before the failing one, and an upload
/// whose expiration tag could not be written keeps the upload result.
#[derive(Debug)]
pub struct PartialFailure<T> {
    /// What was produced before the failure
    pub partial: T,
    /// The failure that stopped the operation
    pub error: Error,
}

impl<T> PartialFailure<T> {
    pub fn new(partial: T, error: Error) -> Self {
        Self { partial, error }
    }
}

impl<T: Default> From<Error> for PartialFailure<T> {
    fn from(error: Error) -> Self {
        Self::new(T::default(), error)
    }
}

impl<T> std::fmt::Display for PartialFailure<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.error.fmt(f)
    }
}

impl<T: std::fmt::Debug> std::error::Error for PartialFailure<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
