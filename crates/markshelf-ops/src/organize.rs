//! Rebuilding a bookmark tree from a category mapping.

use std::collections::HashMap;

use markshelf_core::{Categories, FlatBookmark, Folder, OrganizeConfig, flatten};

use crate::sort::sort_tree;
use crate::subfolders::split_into_subfolders;

/// Title of the folder that collects everything no category claimed.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Builds a new folder hierarchy with one folder per category.
///
/// The input tree is never modified; [`Organizer::organize`] works on
/// copies and returns a fresh root.
#[derive(Debug, Default)]
pub struct Organizer {
    config: OrganizeConfig,
}

impl Organizer {
    /// Create an organizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an organizer with custom configuration.
    pub fn with_config(config: OrganizeConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &OrganizeConfig {
        &self.config
    }

    /// Rebuild `root` around `categories`.
    ///
    /// Category items are matched to tree bookmarks by URL, and every tree
    /// bookmark with a matching URL is placed exactly once. Bookmarks that
    /// end up in no category land in an `Uncategorized` folder. The result
    /// is sorted with [`sort_tree`], so `Uncategorized` takes its
    /// alphabetical place among the other folders.
    pub fn organize(&self, root: &Folder, categories: &Categories) -> Folder {
        let flat = flatten(root);

        let mut by_url: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, item) in flat.iter().enumerate() {
            if !item.bookmark.is_inert() {
                by_url.entry(item.url()).or_default().push(index);
            }
        }

        let mut placed = vec![false; flat.len()];
        let mut category_folders = Vec::new();

        for (name, items) in categories {
            let mut members = Vec::new();
            for item in items {
                let Some(indices) = by_url.get(item.url()) else {
                    continue;
                };
                for &index in indices {
                    if !placed[index] {
                        placed[index] = true;
                        members.push(index);
                    }
                }
            }
            if members.is_empty() {
                continue;
            }

            let folder = self.build_category(root, name, &flat, &members, &mut placed);
            if !folder.is_empty() {
                category_folders.push(folder);
            }
        }

        let mut organized = Folder::new(root.title.clone())
            .with_timestamps(root.date_added, root.last_modified);
        if self.config.preserve_existing {
            organized.children = root.children.clone();
        }

        tracing::info!(
            categories = category_folders.len(),
            placed = placed.iter().filter(|&&p| p).count(),
            total = flat.len(),
            "organized bookmarks"
        );
        organized.children.extend(category_folders.into_iter().map(Into::into));

        let mut uncategorized = Self::folder_like(root, UNCATEGORIZED);
        for (item, _) in flat.iter().zip(&placed).filter(|(_, done)| !**done) {
            uncategorized.push(item.bookmark.clone());
        }
        if !uncategorized.is_empty() {
            tracing::debug!(count = uncategorized.children.len(), "uncategorized bookmarks");
            organized.push(uncategorized);
        }

        sort_tree(&mut organized);
        organized
    }

    /// Build one category folder, splitting it when it is too large.
    ///
    /// Members the split leaves out are marked unplaced again.
    fn build_category(
        &self,
        root: &Folder,
        name: &str,
        flat: &[FlatBookmark],
        members: &[usize],
        placed: &mut [bool],
    ) -> Folder {
        let mut folder = Self::folder_like(root, name);

        if members.len() <= self.config.max_per_folder {
            for &index in members {
                folder.push(flat[index].bookmark.clone());
            }
            return folder;
        }

        let items: Vec<FlatBookmark> = members.iter().map(|&index| flat[index].clone()).collect();
        let groups = split_into_subfolders(&items, self.config.max_per_folder);
        tracing::debug!(
            category = name,
            size = members.len(),
            subfolders = groups.len(),
            "splitting category"
        );

        let mut grouped = vec![false; members.len()];
        for (sub_name, positions) in groups {
            if positions.is_empty() {
                continue;
            }
            let mut sub = Self::folder_like(root, &sub_name);
            for position in positions {
                grouped[position] = true;
                sub.push(items[position].bookmark.clone());
            }
            folder.push(sub);
        }

        for (position, &index) in members.iter().enumerate() {
            if !grouped[position] {
                placed[index] = false;
            }
        }

        folder
    }

    fn folder_like(root: &Folder, title: &str) -> Folder {
        Folder::new(title).with_timestamps(root.date_added, root.last_modified)
    }
}
