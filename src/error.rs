//! Error handling for lexirank

use thiserror::Error;

/// Main error type for lexirank
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexirankError {
    #[error("Input error: {message}")]
    Input {
        message: String,
        path: Option<String>,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },
}

impl LexirankError {
    /// Create an input error, optionally tied to a file
    pub fn input(message: impl Into<String>, path: Option<String>) -> Self {
        Self::Input {
            message: message.into(),
            path,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>, path: Option<String>) -> Self {
        Self::Io {
            message: message.into(),
            path,
        }
    }

    /// Whether the caller sent something we refuse to act on
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::NotFound { .. })
    }
}

impl From<std::io::Error> for LexirankError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string(), None)
    }
}

impl From<rusqlite::Error> for LexirankError {
    fn from(err: rusqlite::Error) -> Self {
        Self::storage(err.to_string())
    }
}

impl From<r2d2::Error> for LexirankError {
    fn from(err: r2d2::Error) -> Self {
        Self::storage(format!("connection pool: {err}"))
    }
}

impl From<csv::Error> for LexirankError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            Self::io(err.to_string(), None)
        } else {
            Self::input(err.to_string(), None)
        }
    }
}

/// Result type alias for lexirank operations
pub type Result<T> = std::result::Result<T, LexirankError>;
