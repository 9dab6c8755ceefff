//! Error types for the MOLA session layer

use std::fmt;

use thiserror::Error;

/// Result type alias for MOLA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// The verb family a failed request belonged to.
///
/// Only used to pick the user-facing message; the dispatcher carries no other
/// detail about a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Send,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Operation::Get => "get",
            Operation::Send => "send",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(verb)
    }
}

/// API-related errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to {operation} data")]
    RequestFailed { operation: Operation },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Server response did not include a session token")]
    MissingToken,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Session token rejections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Session token is malformed")]
    MalformedToken,

    #[error("Session token has expired. Run `mola login` to sign in again.")]
    Expired,

    #[error("Session token carries an unrecognized role: {0}")]
    UnrecognizedRole(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `mola init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Session persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read session storage: {0}")]
    Read(String),

    #[error("Failed to write session storage: {0}")]
    Write(String),
}
