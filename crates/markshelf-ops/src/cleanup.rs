//! Removing broken links and merging duplicates.
//!
//! Both operations clone the input tree and prune the copy. Folders are
//! kept even when they end up empty.

use std::collections::{HashMap, HashSet};

use markshelf_core::{BrokenLink, DuplicateGroups, FlatBookmark, Folder, flatten, retain_bookmarks};

/// Copy of `root` without any bookmark whose URL is in `broken`.
pub fn remove_broken_links(root: &Folder, broken: &[BrokenLink]) -> Folder {
    let broken_urls: HashSet<&str> = broken.iter().map(BrokenLink::url).collect();

    let mut result = root.clone();
    let before = result.bookmark_count();
    retain_bookmarks(&mut result, |bookmark, _| !broken_urls.contains(bookmark.url.as_str()));

    tracing::info!(
        removed = before - result.bookmark_count(),
        "removed broken links"
    );
    result
}

/// Copy of `root` keeping one bookmark per duplicate group.
///
/// The survivor of each group is the member with the highest
/// [`survivor_score`] among those whose URL is still in `root`; the first
/// member wins a tie. Members with another URL are removed wherever they
/// occur. Other copies of the survivor's own URL are removed too, so
/// exactly one bookmark remains for it. Groups with no member left in
/// `root` are skipped.
pub fn merge_duplicates(root: &Folder, groups: &DuplicateGroups) -> Folder {
    let flat = flatten(root);
    let present: HashSet<&str> = flat.iter().map(FlatBookmark::url).collect();

    let mut remove_urls: HashSet<&str> = HashSet::new();
    let mut survivors: HashMap<&str, usize> = HashMap::new();

    for members in groups.values() {
        let in_tree = members.iter().filter(|member| present.contains(member.url()));
        let Some(survivor) = choose_survivor(in_tree) else {
            continue;
        };
        let keep_url = survivor.url();

        for member in members {
            if !member.url().is_empty() && member.url() != keep_url {
                remove_urls.insert(member.url());
            }
        }

        if keep_url.is_empty() {
            continue;
        }
        let position = flat
            .iter()
            .position(|item| item == survivor)
            .or_else(|| flat.iter().position(|item| item.url() == keep_url));
        if let Some(position) = position {
            survivors.insert(keep_url, position);
        }
    }

    let mut result = root.clone();
    let before = flat.len();
    let mut index = 0;
    retain_bookmarks(&mut result, |bookmark, _| {
        let current = index;
        index += 1;

        let url = bookmark.url.as_str();
        if remove_urls.contains(url) {
            return false;
        }
        survivors.get(url).is_none_or(|&keep| keep == current)
    });

    tracing::info!(
        groups = groups.len(),
        removed = before - result.bookmark_count(),
        "merged duplicates"
    );
    result
}

/// Score used to pick the bookmark that survives a merge.
///
/// A title is worth 10, an icon 5 and a known creation date 1; every
/// folder level costs 1.
pub fn survivor_score(item: &FlatBookmark) -> i64 {
    let mut score = 0;
    if !item.bookmark.title.is_empty() {
        score += 10;
    }
    if item.bookmark.has_icon() {
        score += 5;
    }
    score -= item.depth() as i64;
    if item.bookmark.date_added > 0 {
        score += 1;
    }
    score
}

/// Highest-scoring member, first one on ties.
pub fn choose_survivor<'a, I>(members: I) -> Option<&'a FlatBookmark>
where
    I: IntoIterator<Item = &'a FlatBookmark>,
{
    let mut best: Option<(&FlatBookmark, i64)> = None;
    for member in members {
        let score = survivor_score(member);
        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((member, score)),
        }
    }
    best.map(|(member, _)| member)
}
