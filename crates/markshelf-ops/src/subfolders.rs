//! Splitting oversized categories into subfolders.
//!
//! The grouping cascade tries, in order:
//!
//! 1. One subfolder per host, when there are 2 to 10 hosts
//! 2. One subfolder per top-level domain, when there are more than 10
//!    hosts and 2 to 10 TLDs
//! 3. Alphabetical ranges by first title letter

use std::collections::BTreeMap;

use indexmap::IndexMap;
use markshelf_core::FlatBookmark;
use markshelf_core::urls::{base_name, extract_domain, top_level_label};

/// Smallest and largest group count the host and TLD groupings accept.
const MIN_GROUPS: usize = 2;
const MAX_GROUPS: usize = 10;

/// Bucket for titles that do not start with a letter.
pub const NON_LETTER_BUCKET: &str = "#";

/// Subfolder name mapped to indices into the split items.
pub type Subfolders = IndexMap<String, Vec<usize>>;

/// Split items into named subfolders.
///
/// Returned indices point into `items`. With the host and TLD groupings,
/// items without a host are left out and belong to no subfolder.
pub fn split_into_subfolders(items: &[FlatBookmark], max_per_folder: usize) -> Subfolders {
    let mut by_domain: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (index, item) in items.iter().enumerate() {
        let domain = extract_domain(item.url());
        if !domain.is_empty() {
            by_domain.entry(domain).or_default().push(index);
        }
    }

    if (MIN_GROUPS..=MAX_GROUPS).contains(&by_domain.len()) {
        tracing::debug!(groups = by_domain.len(), "splitting by host");
        return regroup(by_domain, |domain| capitalize(base_name(domain)));
    }

    if by_domain.len() > MAX_GROUPS {
        let by_tld = regroup(by_domain, |domain| {
            top_level_label(domain).unwrap_or("other").to_string()
        });
        if (MIN_GROUPS..=MAX_GROUPS).contains(&by_tld.len()) {
            tracing::debug!(groups = by_tld.len(), "splitting by top-level domain");
            return by_tld
                .into_iter()
                .map(|(tld, members)| (format!("{} Sites", tld.to_uppercase()), members))
                .collect();
        }
    }

    tracing::debug!("splitting alphabetically");
    alphabetical(items, max_per_folder)
}

/// Rename groups, merging the ones whose new names collide.
fn regroup(groups: IndexMap<String, Vec<usize>>, name: impl Fn(&str) -> String) -> Subfolders {
    let mut renamed = Subfolders::new();
    for (key, members) in groups {
        renamed.entry(name(&key)).or_default().extend(members);
    }
    renamed
}

/// Bucket by first title letter, then merge adjacent buckets while they fit.
fn alphabetical(items: &[FlatBookmark], max_per_folder: usize) -> Subfolders {
    let mut buckets: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, item) in items.iter().enumerate() {
        buckets.entry(first_letter(item.title())).or_default().push(index);
    }

    let mut ranges = Subfolders::new();
    let mut current: Vec<usize> = Vec::new();
    let mut letters: Vec<String> = Vec::new();

    for (letter, members) in buckets {
        if current.len() + members.len() > max_per_folder && !current.is_empty() {
            ranges.insert(letters.join("-"), std::mem::take(&mut current));
            letters.clear();
        }
        current.extend(members);
        letters.push(letter);
    }
    if !current.is_empty() {
        ranges.insert(letters.join("-"), current);
    }

    ranges
}

fn first_letter(title: &str) -> String {
    match title.chars().next() {
        Some(c) if c.is_alphabetic() => c.to_uppercase().collect(),
        _ => NON_LETTER_BUCKET.to_string(),
    }
}

/// Uppercase the first character and lowercase the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
