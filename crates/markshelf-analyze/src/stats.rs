//! Collection statistics.

use std::collections::BTreeMap;

use chrono::DateTime;
use indexmap::IndexMap;
use markshelf_core::urls::extract_domain;
use markshelf_core::{Folder, TreeCounts, count_nodes, flatten};
use serde::{Deserialize, Serialize};

/// Number of domains listed in [`BookmarkStats::top_domains`].
pub const TOP_DOMAINS: usize = 20;

/// A domain and how many bookmarks point at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCount {
    pub domain: String,
    pub count: usize,
}

/// Summary of a bookmark collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkStats {
    /// Number of bookmarks, empty-URL ones included.
    pub total_bookmarks: usize,

    /// Most common domains, most frequent first.
    pub top_domains: Vec<DomainCount>,

    /// Bookmarks added per `YYYY-MM` (UTC); undated bookmarks are left out.
    pub bookmarks_by_month: BTreeMap<String, usize>,

    /// Mean folder path length, root included.
    pub average_path_depth: f64,

    /// Bookmark and folder totals.
    pub counts: TreeCounts,
}

impl BookmarkStats {
    /// Compute statistics for a tree.
    pub fn from_tree(root: &Folder) -> Self {
        let bookmarks = flatten(root);

        let mut domains: IndexMap<String, usize> = IndexMap::new();
        let mut by_month: BTreeMap<String, usize> = BTreeMap::new();
        let mut depth_sum = 0;

        for bookmark in &bookmarks {
            let domain = extract_domain(bookmark.url());
            if !domain.is_empty() {
                *domains.entry(domain).or_default() += 1;
            }

            let added = bookmark.bookmark.date_added;
            let date = (added != 0)
                .then(|| DateTime::from_timestamp_millis(added))
                .flatten();
            if let Some(date) = date {
                *by_month.entry(date.format("%Y-%m").to_string()).or_default() += 1;
            }

            depth_sum += bookmark.depth();
        }

        // Stable sort keeps first-seen order among equal counts.
        domains.sort_by(|_, a, _, b| b.cmp(a));
        let top_domains = domains
            .into_iter()
            .take(TOP_DOMAINS)
            .map(|(domain, count)| DomainCount { domain, count })
            .collect();

        let average_path_depth = if bookmarks.is_empty() {
            0.0
        } else {
            depth_sum as f64 / bookmarks.len() as f64
        };

        Self {
            total_bookmarks: bookmarks.len(),
            top_domains,
            bookmarks_by_month: by_month,
            average_path_depth,
            counts: count_nodes(root),
        }
    }

    /// Check if the collection has no bookmarks.
    pub fn is_empty(&self) -> bool {
        self.total_bookmarks == 0
    }

    /// Month with the most additions, if any bookmark is dated.
    pub fn busiest_month(&self) -> Option<(&str, usize)> {
        self.bookmarks_by_month
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(month, count)| (month.as_str(), *count))
    }
}
