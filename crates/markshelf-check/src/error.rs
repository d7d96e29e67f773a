//! Error types for link checking.

use thiserror::Error;

/// Errors raised while setting up a link check.
///
/// Individual probe failures are never errors; they become a
/// [`LinkStatus`](markshelf_core::LinkStatus) on the bookmark instead.
#[derive(Debug, Error)]
pub enum CheckError {
    /// An exclude pattern is not a valid glob.
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// A config value would leave the checker unable to run.
    #[error("Invalid check configuration: {message}")]
    InvalidConfig { message: String },

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl CheckError {
    /// Create an invalid-pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: globset::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create an invalid-config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
