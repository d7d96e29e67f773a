//! Error types for loading and configuring bookmark trees.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading bookmark sources or settings.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// Source file does not exist.
    #[error("Bookmark file not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source could not be parsed into a bookmark tree.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// JSON source or output was malformed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings file was malformed or inconsistent.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl BookmarkError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
