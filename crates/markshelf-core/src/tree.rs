//! Tree traversal shared by every component.
//!
//! [`flatten`] is the one canonical walk over a bookmark tree. Analysis code
//! works on the flat view it produces; rewriting code uses
//! [`retain_bookmarks`], which walks in the same order and reports the same
//! folder paths.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::node::{Bookmark, Folder, Node};

/// A bookmark annotated with the titles of its ancestor folders.
///
/// The path starts with the root folder's title, so a bookmark placed
/// directly in the root has a path of length 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatBookmark {
    /// Copy of the bookmark.
    #[serde(flatten)]
    pub bookmark: Bookmark,

    /// Ancestor folder titles from the root down.
    pub folder_path: Vec<CompactString>,
}

impl FlatBookmark {
    /// Create a flat bookmark with an explicit path.
    pub fn new(bookmark: Bookmark, folder_path: Vec<CompactString>) -> Self {
        Self {
            bookmark,
            folder_path,
        }
    }

    /// Bookmark URL.
    pub fn url(&self) -> &str {
        &self.bookmark.url
    }

    /// Bookmark title.
    pub fn title(&self) -> &str {
        &self.bookmark.title
    }

    /// Nesting depth including the root.
    pub fn depth(&self) -> usize {
        self.folder_path.len()
    }

    /// Folder path without the root, joined with `/`.
    pub fn display_path(&self) -> String {
        self.folder_path
            .iter()
            .skip(1)
            .map(CompactString::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Flatten a tree into its bookmarks, depth-first in insertion order.
pub fn flatten(root: &Folder) -> Vec<FlatBookmark> {
    let mut result = Vec::new();
    let mut path = Vec::new();
    collect(root, &mut path, &mut result);
    result
}

fn collect(folder: &Folder, path: &mut Vec<CompactString>, out: &mut Vec<FlatBookmark>) {
    path.push(folder.title.clone());
    for child in &folder.children {
        match child {
            Node::Bookmark(bookmark) => {
                out.push(FlatBookmark::new(bookmark.clone(), path.clone()));
            }
            Node::Folder(sub) => collect(sub, path, out),
        }
    }
    path.pop();
}

/// Keep only the bookmarks for which `keep` returns true, at every depth.
///
/// The predicate receives each bookmark with its folder path (root
/// included, as in [`flatten`]). Folders are never removed, even when
/// they end up empty.
pub fn retain_bookmarks<F>(root: &mut Folder, mut keep: F)
where
    F: FnMut(&Bookmark, &[CompactString]) -> bool,
{
    let mut path = Vec::new();
    retain_in(root, &mut path, &mut keep);
}

fn retain_in<F>(folder: &mut Folder, path: &mut Vec<CompactString>, keep: &mut F)
where
    F: FnMut(&Bookmark, &[CompactString]) -> bool,
{
    path.push(folder.title.clone());
    let children = std::mem::take(&mut folder.children);
    for child in children {
        match child {
            Node::Bookmark(bookmark) => {
                if keep(&bookmark, path) {
                    folder.children.push(Node::Bookmark(bookmark));
                }
            }
            Node::Folder(mut sub) => {
                retain_in(&mut sub, path, keep);
                folder.children.push(Node::Folder(sub));
            }
        }
    }
    path.pop();
}

/// Bookmark and folder totals for a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeCounts {
    /// Number of bookmarks.
    pub bookmarks: usize,
    /// Number of folders, the root excluded.
    pub folders: usize,
}

/// Count bookmarks and folders below the root.
pub fn count_nodes(root: &Folder) -> TreeCounts {
    TreeCounts {
        bookmarks: root.bookmark_count(),
        folders: root.folder_count(),
    }
}
