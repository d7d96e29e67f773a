//! Results produced by validation and categorization.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::tree::FlatBookmark;

/// Normalized-URL key mapped to every bookmark sharing it.
///
/// Only keys with at least two members are kept.
pub type DuplicateGroups = IndexMap<String, Vec<FlatBookmark>>;

/// Category name mapped to its bookmarks. A URL appears in at most one category.
pub type Categories = IndexMap<String, Vec<FlatBookmark>>;

/// Outcome of probing a single URL.
///
/// Serialized as its display string, e.g. `"HTTP 404"` or `"Timeout"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum LinkStatus {
    /// The server answered with this status code.
    Http(u16),
    /// The request exceeded its timeout.
    Timeout,
    /// The connection could not be established.
    ConnectionError,
    /// The redirect chain exceeded the limit.
    TooManyRedirects,
    /// The URL is not fetchable over HTTP.
    Skipped,
    /// Any other transport error, as reported by the client.
    Transport(String),
    /// The probe itself failed unexpectedly.
    Unexpected(String),
}

impl LinkStatus {
    /// Check if this status marks the link as broken.
    pub fn is_broken(&self) -> bool {
        match self {
            LinkStatus::Http(code) => *code >= 400,
            LinkStatus::Skipped => false,
            _ => true,
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStatus::Http(code) => write!(f, "HTTP {code}"),
            LinkStatus::Timeout => f.write_str("Timeout"),
            LinkStatus::ConnectionError => f.write_str("Connection Error"),
            LinkStatus::TooManyRedirects => f.write_str("Too Many Redirects"),
            LinkStatus::Skipped => f.write_str("Skipped (non-HTTP URL)"),
            LinkStatus::Transport(message) => f.write_str(message),
            LinkStatus::Unexpected(message) => write!(f, "Error: {message}"),
        }
    }
}

impl From<LinkStatus> for String {
    fn from(status: LinkStatus) -> Self {
        status.to_string()
    }
}

impl From<String> for LinkStatus {
    fn from(text: String) -> Self {
        if let Some(code) = text.strip_prefix("HTTP ").and_then(|c| c.parse().ok()) {
            return LinkStatus::Http(code);
        }
        match text.as_str() {
            "Timeout" => LinkStatus::Timeout,
            "Connection Error" => LinkStatus::ConnectionError,
            "Too Many Redirects" => LinkStatus::TooManyRedirects,
            "Skipped (non-HTTP URL)" => LinkStatus::Skipped,
            _ => match text.strip_prefix("Error: ") {
                Some(message) => LinkStatus::Unexpected(message.to_string()),
                None => LinkStatus::Transport(text),
            },
        }
    }
}

/// A bookmark whose URL failed its liveness check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokenLink {
    /// The bookmark and its location.
    #[serde(flatten)]
    pub bookmark: FlatBookmark,

    /// Why the link is considered broken.
    pub status: LinkStatus,
}

impl BrokenLink {
    /// Create a broken-link record.
    pub fn new(bookmark: FlatBookmark, status: LinkStatus) -> Self {
        Self { bookmark, status }
    }

    /// URL of the broken bookmark.
    pub fn url(&self) -> &str {
        self.bookmark.url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        assert_eq!(LinkStatus::Http(404).to_string(), "HTTP 404");
        assert_eq!(LinkStatus::ConnectionError.to_string(), "Connection Error");
        assert_eq!(LinkStatus::Unexpected("boom".into()).to_string(), "Error: boom");
    }

    #[test]
    fn test_status_parse_back() {
        for status in [
            LinkStatus::Http(503),
            LinkStatus::Timeout,
            LinkStatus::ConnectionError,
            LinkStatus::TooManyRedirects,
            LinkStatus::Skipped,
            LinkStatus::Transport("builder error".into()),
            LinkStatus::Unexpected("boom".into()),
        ] {
            assert_eq!(LinkStatus::from(status.to_string()), status);
        }
    }

    #[test]
    fn test_is_broken() {
        assert!(!LinkStatus::Http(200).is_broken());
        assert!(!LinkStatus::Http(399).is_broken());
        assert!(LinkStatus::Http(400).is_broken());
        assert!(!LinkStatus::Skipped.is_broken());
        assert!(LinkStatus::Timeout.is_broken());
    }
}
