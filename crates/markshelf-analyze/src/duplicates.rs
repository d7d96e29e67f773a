//! Duplicate bookmark detection.
//!
//! Bookmarks are grouped by a normalized form of their URL so that trivial
//! variations (scheme, `www.`, trailing slashes, tracking parameters) do not
//! hide duplicates:
//!
//! 1. Lowercase the host and strip a leading `www.`
//! 2. Strip trailing slashes from the path
//! 3. Force the scheme to `https`
//! 4. YouTube links keep only their `v` parameter
//! 5. Everything else loses its tracking parameters

use markshelf_core::{DuplicateConfig, DuplicateGroups, FlatBookmark, Folder, flatten};
use url::Url;

/// Query parameters that never change which resource a URL points to.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ref",
    "source",
    "ref_src",
    "ref_url",
    "_ga",
];

/// Normalize a URL for duplicate comparison.
///
/// URLs that cannot be parsed, or that have no host, are returned unchanged.
pub fn normalize_url(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::debug!(url, error = %err, "URL normalization failed, using raw URL");
            return url.to_string();
        }
    };

    let Some(host) = parsed.host_str() else {
        tracing::debug!(url, "URL has no host, using raw URL");
        return url.to_string();
    };

    let host = host.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let authority = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let path = parsed.path().trim_end_matches('/');
    let query = parsed.query().unwrap_or_default();

    let query = if host.contains("youtube.com") || host.contains("youtu.be") {
        query
            .split('&')
            .find(|pair| pair.split_once('=').is_some_and(|(name, _)| name == "v"))
            .map(str::to_string)
            .unwrap_or_default()
    } else {
        strip_tracking_params(query)
    };

    if query.is_empty() {
        format!("https://{authority}{path}")
    } else {
        format!("https://{authority}{path}?{query}")
    }
}

/// Remove tracking parameters (and parameters without a value) from a query string.
fn strip_tracking_params(query: &str) -> String {
    query
        .split('&')
        .filter(|pair| match pair.split_once('=') {
            Some((name, _)) => !TRACKING_PARAMS.contains(&name.to_lowercase().as_str()),
            None => false,
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Hook for merging duplicate groups whose URLs differ only in ways
/// normalization does not cover.
pub trait TitleRefiner: Send + Sync {
    /// Adjust the groups in place.
    fn refine(&self, groups: &mut DuplicateGroups);
}

/// Refiner that leaves the groups untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRefinement;

impl TitleRefiner for NoRefinement {
    fn refine(&self, _groups: &mut DuplicateGroups) {}
}

/// Duplicate bookmark finder.
pub struct DuplicateFinder {
    config: DuplicateConfig,
    refiner: Box<dyn TitleRefiner>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with default config.
    pub fn new() -> Self {
        Self::with_config(DuplicateConfig::default())
    }

    /// Create a new duplicate finder with custom config.
    pub fn with_config(config: DuplicateConfig) -> Self {
        Self {
            config,
            refiner: Box::new(NoRefinement),
        }
    }

    /// Replace the title refinement pass.
    pub fn with_refiner(mut self, refiner: impl TitleRefiner + 'static) -> Self {
        self.refiner = Box::new(refiner);
        self
    }

    /// Find duplicates anywhere in a bookmark tree.
    pub fn find_duplicates(&self, root: &Folder) -> DuplicateGroups {
        self.find_in(&flatten(root))
    }

    /// Group flat bookmarks by URL key, keeping groups with two or more members.
    ///
    /// Groups are ordered by first appearance, and members keep their input order.
    pub fn find_in(&self, bookmarks: &[FlatBookmark]) -> DuplicateGroups {
        let mut groups = DuplicateGroups::new();

        for bookmark in bookmarks {
            let url = bookmark.url();
            if url.is_empty() {
                continue;
            }

            let key = if self.config.normalize {
                normalize_url(url)
            } else {
                url.to_string()
            };
            groups.entry(key).or_default().push(bookmark.clone());
        }

        groups.retain(|_, members| members.len() > 1);
        self.refiner.refine(&mut groups);

        tracing::debug!(
            groups = groups.len(),
            bookmarks = groups.values().map(Vec::len).sum::<usize>(),
            "duplicate detection finished"
        );
        groups
    }
}

impl Default for DuplicateFinder {
    fn default() -> Self {
        Self::new()
    }
}
