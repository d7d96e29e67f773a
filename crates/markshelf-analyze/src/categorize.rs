//! Multi-strategy bookmark categorization.
//!
//! Five independent strategies each propose categories. Their proposals are
//! merged in priority order (domain, title keyword, path, folder, TLD) so
//! that every URL ends up in at most one category. Bookmarks no strategy
//! claimed can then be clustered into extra categories by title and domain.

use std::collections::HashSet;

use indexmap::IndexMap;
use markshelf_core::urls::{extract_domain, lowercase_path, top_level_label};
use markshelf_core::{CategorizeConfig, Categories, FlatBookmark, Folder, flatten};
use rayon::prelude::*;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::cluster::{TextClusterer, TfidfDbscan};
use crate::rules::RuleSet;
use crate::text::{significant_words, title_case};

/// Name used when a cluster has no common words or domain.
pub const FALLBACK_CLUSTER_NAME: &str = "Related Resources";

/// A categorization strategy. Declaration order is merge priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Strategy {
    /// Host matched against the domain rules.
    Domain,
    /// Significant title words matched against the keyword rules.
    Title,
    /// Lowercased URL path matched against the path rules.
    Path,
    /// First folder below the root.
    Folder,
    /// Top-level domain label matched against the TLD rules.
    Tld,
}

impl Strategy {
    /// All strategies, highest priority first.
    pub fn by_priority() -> impl Iterator<Item = Strategy> {
        Strategy::iter()
    }
}

/// Assigns bookmarks to named categories.
pub struct Categorizer {
    config: CategorizeConfig,
    rules: RuleSet,
    clusterer: Box<dyn TextClusterer>,
}

impl Categorizer {
    /// Create a categorizer with the default config and built-in rules.
    pub fn new() -> Self {
        Self::with_config(CategorizeConfig::default())
    }

    /// Create a categorizer with custom config. Extra rules in the config
    /// are tried before the built-in ones.
    pub fn with_config(config: CategorizeConfig) -> Self {
        let rules = RuleSet::from_config(&config);
        Self {
            config,
            rules,
            clusterer: Box::new(TfidfDbscan::default()),
        }
    }

    /// Replace the rule tables.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the clustering algorithm.
    pub fn with_clusterer(mut self, clusterer: impl TextClusterer + 'static) -> Self {
        self.clusterer = Box::new(clusterer);
        self
    }

    /// Rule tables in use.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Categorize every bookmark in a tree.
    pub fn categorize(&self, root: &Folder) -> Categories {
        self.categorize_flat(&flatten(root))
    }

    /// Categorize flat bookmarks. Bookmarks without a URL are ignored.
    pub fn categorize_flat(&self, bookmarks: &[FlatBookmark]) -> Categories {
        let bookmarks: Vec<FlatBookmark> = bookmarks
            .iter()
            .filter(|b| !b.bookmark.is_inert())
            .cloned()
            .collect();

        let proposals: Vec<Categories> = Strategy::by_priority()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|strategy| {
                let categories = self.apply_strategy(strategy, &bookmarks);
                tracing::debug!(%strategy, categories = categories.len(), "strategy applied");
                categories
            })
            .collect();

        let mut merged = merge_by_priority(&proposals);

        if self.config.use_clustering && bookmarks.len() > self.config.min_bookmarks_for_clustering
        {
            merged = self.refine_with_clusters(&bookmarks, merged);
        }

        let result = filter_and_sort(merged, self.config.min_category_size);
        tracing::info!(
            bookmarks = bookmarks.len(),
            categories = result.len(),
            "categorization finished"
        );
        result
    }

    /// Run a single strategy.
    pub fn apply_strategy(&self, strategy: Strategy, bookmarks: &[FlatBookmark]) -> Categories {
        let mut categories = Categories::new();

        for bookmark in bookmarks {
            let category = match strategy {
                Strategy::Domain => self.by_domain(bookmark),
                Strategy::Tld => self.by_tld(bookmark),
                Strategy::Path => self.rules.match_path(&lowercase_path(bookmark.url())),
                Strategy::Title => self.by_title(bookmark),
                Strategy::Folder => bookmark.folder_path.get(1).map(|name| name.as_str()),
            };

            if let Some(category) = category {
                categories
                    .entry(category.to_string())
                    .or_default()
                    .push(bookmark.clone());
            }
        }

        categories
    }

    fn by_domain(&self, bookmark: &FlatBookmark) -> Option<&str> {
        let domain = extract_domain(bookmark.url());
        if domain.is_empty() {
            return None;
        }
        let host = markshelf_core::urls::strip_port(&domain);
        self.rules.match_domain(host, &lowercase_path(bookmark.url()))
    }

    fn by_tld(&self, bookmark: &FlatBookmark) -> Option<&str> {
        let domain = extract_domain(bookmark.url());
        top_level_label(&domain).and_then(|tld| self.rules.match_tld(tld))
    }

    fn by_title(&self, bookmark: &FlatBookmark) -> Option<&str> {
        let tokens: HashSet<String> = significant_words(bookmark.title()).into_iter().collect();
        if tokens.is_empty() {
            return None;
        }
        self.rules.match_keyword(&tokens)
    }

    /// Cluster unclaimed bookmarks into additional categories.
    ///
    /// Returns `merged` unchanged when too few bookmarks are unclaimed or
    /// clustering fails.
    pub fn refine_with_clusters(&self, bookmarks: &[FlatBookmark], merged: Categories) -> Categories {
        let claimed: HashSet<&str> = merged.values().flatten().map(FlatBookmark::url).collect();

        let mut seen = HashSet::new();
        let unclaimed: Vec<&FlatBookmark> = bookmarks
            .iter()
            .filter(|b| !claimed.contains(b.url()) && seen.insert(b.url()))
            .collect();

        if unclaimed.len() < self.config.min_unclaimed_for_clustering {
            tracing::debug!(unclaimed = unclaimed.len(), "too few unclaimed bookmarks to cluster");
            return merged;
        }

        let texts: Vec<String> = unclaimed
            .iter()
            .map(|b| format!("{} {}", b.title(), extract_domain(b.url())))
            .collect();

        let labels = match self.clusterer.cluster(&texts) {
            Ok(labels) => labels,
            Err(err) => {
                tracing::warn!(error = %err, "clustering failed, keeping rule-based categories");
                return merged;
            }
        };

        let mut members: IndexMap<usize, Vec<FlatBookmark>> = IndexMap::new();
        for (bookmark, label) in unclaimed.iter().zip(&labels) {
            if let Some(label) = label {
                members.entry(*label).or_default().push((*bookmark).clone());
            }
        }
        let names: IndexMap<usize, String> = members
            .iter()
            .map(|(label, cluster)| (*label, name_cluster(cluster)))
            .collect();

        let mut result = merged;
        for (bookmark, label) in unclaimed.into_iter().zip(labels) {
            if let Some(name) = label.and_then(|label| names.get(&label)) {
                result.entry(name.clone()).or_default().push(bookmark.clone());
            }
        }

        tracing::debug!(clusters = names.len(), "clustering refinement applied");
        result
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge strategy proposals, highest priority first.
///
/// A bookmark is added to its proposed category only if no earlier
/// proposal already claimed its URL.
pub fn merge_by_priority(proposals: &[Categories]) -> Categories {
    let mut claimed: HashSet<String> = HashSet::new();
    let mut merged = Categories::new();

    for proposal in proposals {
        for (category, bookmarks) in proposal {
            for bookmark in bookmarks {
                let url = bookmark.url();
                if url.is_empty() || claimed.contains(url) {
                    continue;
                }
                claimed.insert(url.to_string());
                merged
                    .entry(category.clone())
                    .or_default()
                    .push(bookmark.clone());
            }
        }
    }

    merged
}

/// Drop categories smaller than `min_items`, then order by size
/// (largest first) and name.
pub fn filter_and_sort(mut categories: Categories, min_items: usize) -> Categories {
    categories.retain(|_, items| items.len() >= min_items);
    categories.sort_by(|name_a, items_a, name_b, items_b| {
        items_b
            .len()
            .cmp(&items_a.len())
            .then_with(|| name_a.cmp(name_b))
    });
    categories
}

/// Name a cluster after its most common title words, else its most common domain.
pub fn name_cluster(members: &[FlatBookmark]) -> String {
    let mut word_counts: IndexMap<String, usize> = IndexMap::new();
    let mut domain_counts: IndexMap<String, usize> = IndexMap::new();

    for bookmark in members {
        for word in significant_words(bookmark.title()) {
            *word_counts.entry(word).or_default() += 1;
        }
        let domain = extract_domain(bookmark.url());
        if !domain.is_empty() {
            *domain_counts.entry(domain).or_default() += 1;
        }
    }

    let common_words: Vec<&str> = most_common(&word_counts)
        .take(3)
        .filter(|(word, count)| *count > 1 && word.chars().count() > 3)
        .map(|(word, _)| word)
        .collect();

    if !common_words.is_empty() {
        return title_case(&common_words.join(" "));
    }

    match most_common(&domain_counts).next() {
        Some((domain, _)) => {
            let first_label = domain.split('.').next().unwrap_or(domain);
            format!("{} Resources", title_case(first_label))
        }
        None => FALLBACK_CLUSTER_NAME.to_string(),
    }
}

/// Entries by count descending; equal counts keep insertion order.
fn most_common(counts: &IndexMap<String, usize>) -> impl Iterator<Item = (&str, usize)> {
    let mut entries: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.into_iter()
}
