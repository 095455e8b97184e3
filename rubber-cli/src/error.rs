//! Error types for the rubber CLI.

use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug)]
pub enum CliError {
    /// A JSON argument could not be parsed
    InvalidJson(String),

    /// The request never got a response
    RequestFailed { method: String, path: String },

    /// Client or transport error
    Client(rubber_core::RubberError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidJson(msg) => write!(f, "Invalid JSON argument: {}", msg),
            CliError::RequestFailed { method, path } => {
                write!(f, "{} {} failed, no response received", method, path)
            }
            CliError::Client(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<rubber_core::RubberError> for CliError {
    fn from(e: rubber_core::RubberError) -> Self {
        CliError::Client(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::InvalidJson(e.to_string())
    }
}
