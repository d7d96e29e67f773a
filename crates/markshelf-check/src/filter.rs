//! Deciding which URLs get probed.

use std::sync::LazyLock;

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;

use crate::error::CheckError;

/// Browser-internal and script schemes that are never fetched.
const PSEUDO_SCHEMES: &[&str] = &["javascript:", "file:", "chrome:", "edge:", "about:"];

static HTTP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:http|https)://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+(?:[A-Z]{2,6}\.?|[A-Z0-9-]{2,}\.?)|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:[/?#].*)?$",
    )
    .expect("URL pattern is a valid regex")
});

/// Check if the URL uses a scheme that is skipped rather than probed.
pub fn is_pseudo_scheme(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    PSEUDO_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// Check if the URL is a syntactically plausible http(s) URL.
pub fn is_checkable_url(url: &str) -> bool {
    !is_pseudo_scheme(url) && HTTP_URL.is_match(url)
}

/// Selects the URLs a checker run will probe.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    excludes: GlobSet,
}

impl UrlFilter {
    /// Build a filter from glob exclude patterns.
    pub fn new<S: AsRef<str>>(exclude_patterns: &[S]) -> Result<Self, CheckError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in exclude_patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|e| CheckError::invalid_pattern(pattern, e))?;
            builder.add(glob);
        }
        let excludes = builder
            .build()
            .map_err(|e| CheckError::invalid_pattern(exclude_patterns_joined(exclude_patterns), e))?;
        Ok(Self { excludes })
    }

    /// Check if the URL should be probed.
    pub fn should_check(&self, url: &str) -> bool {
        is_checkable_url(url) && !self.is_excluded(url)
    }

    /// Check if the URL matches an exclude pattern.
    pub fn is_excluded(&self, url: &str) -> bool {
        !self.excludes.is_empty() && self.excludes.is_match(url)
    }
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self {
            excludes: GlobSet::empty(),
        }
    }
}

fn exclude_patterns_joined<S: AsRef<str>>(patterns: &[S]) -> String {
    patterns
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkable_urls() {
        assert!(is_checkable_url("https://example.com"));
        assert!(is_checkable_url("http://example.com/"));
        assert!(is_checkable_url("https://sub.example.co.uk/path?q=1"));
        assert!(is_checkable_url("http://localhost:8080/api"));
        assert!(is_checkable_url("http://127.0.0.1:3000/x"));
        assert!(is_checkable_url("HTTPS://EXAMPLE.COM/A"));
        assert!(is_checkable_url("https://github.com#readme"));
        assert!(is_checkable_url("https://docs.rs/tokio/latest/tokio/#features"));
        assert!(is_checkable_url("https://example.com/with space"));
        assert!(is_checkable_url("https://example.com/search?q=rust lang"));
    }

    #[test]
    fn test_uncheckable_urls() {
        assert!(!is_checkable_url(""));
        assert!(!is_checkable_url("ftp://example.com/file"));
        assert!(!is_checkable_url("javascript:void(0)"));
        assert!(!is_checkable_url("file:///home/user/notes.txt"));
        assert!(!is_checkable_url("chrome://settings"));
        assert!(!is_checkable_url("https://"));
        assert!(!is_checkable_url("https://exa mple.com/"));
        assert!(!is_checkable_url("not a url"));
    }

    #[test]
    fn test_pseudo_schemes() {
        assert!(is_pseudo_scheme("JavaScript:alert(1)"));
        assert!(is_pseudo_scheme("about:blank"));
        assert!(is_pseudo_scheme("edge://flags"));
        assert!(!is_pseudo_scheme("https://about.me"));
    }

    #[test]
    fn test_exclude_patterns() {
        let filter = UrlFilter::new(&["*://localhost*", "https://*.internal.corp/*"]).unwrap();

        assert!(!filter.should_check("http://localhost:8080/api"));
        assert!(!filter.should_check("https://wiki.internal.corp/page"));
        assert!(filter.should_check("https://example.com/"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = UrlFilter::new(&["[unclosed"]).unwrap_err();
        assert!(matches!(err, CheckError::InvalidPattern { .. }));
    }
}
