//! Bookmark and folder node types.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A single element of a bookmark tree.
///
/// Serialized with a `type` tag so the JSON form matches the layout of
/// exported bookmark files (`{"type": "folder", "title": ..., "children": [...]}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// A folder containing further nodes.
    Folder(Folder),
    /// A bookmarked URL.
    Bookmark(Bookmark),
}

impl Node {
    /// Check if this is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, Node::Folder(_))
    }

    /// Check if this is a bookmark.
    pub fn is_bookmark(&self) -> bool {
        matches!(self, Node::Bookmark(_))
    }

    /// Title of the node regardless of its kind.
    pub fn title(&self) -> &str {
        match self {
            Node::Folder(folder) => &folder.title,
            Node::Bookmark(bookmark) => &bookmark.title,
        }
    }

    /// Borrow as a folder, if it is one.
    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Node::Folder(folder) => Some(folder),
            Node::Bookmark(_) => None,
        }
    }

    /// Borrow as a bookmark, if it is one.
    pub fn as_bookmark(&self) -> Option<&Bookmark> {
        match self {
            Node::Bookmark(bookmark) => Some(bookmark),
            Node::Folder(_) => None,
        }
    }
}

impl From<Folder> for Node {
    fn from(folder: Folder) -> Self {
        Node::Folder(folder)
    }
}

impl From<Bookmark> for Node {
    fn from(bookmark: Bookmark) -> Self {
        Node::Bookmark(bookmark)
    }
}

/// A folder in the bookmark tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Folder title.
    pub title: CompactString,

    /// Child nodes in insertion order.
    #[serde(default)]
    pub children: Vec<Node>,

    /// Creation time in milliseconds since the Unix epoch (0 = unknown).
    #[serde(default)]
    pub date_added: i64,

    /// Last modification time in milliseconds since the Unix epoch (0 = unknown).
    #[serde(default)]
    pub last_modified: i64,
}

impl Folder {
    /// Create an empty folder.
    pub fn new(title: impl Into<CompactString>) -> Self {
        Self {
            title: title.into(),
            children: Vec::new(),
            date_added: 0,
            last_modified: 0,
        }
    }

    /// Create the conventional root folder.
    pub fn root() -> Self {
        Self::new(crate::ROOT_TITLE)
    }

    /// Set both timestamps.
    pub fn with_timestamps(mut self, date_added: i64, last_modified: i64) -> Self {
        self.date_added = date_added;
        self.last_modified = last_modified;
        self
    }

    /// Append a child and return self.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append a child node.
    pub fn push(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Check if the folder has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of bookmarks anywhere below this folder.
    pub fn bookmark_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                Node::Bookmark(_) => 1,
                Node::Folder(folder) => folder.bookmark_count(),
            })
            .sum()
    }

    /// Number of folders anywhere below this folder (self excluded).
    pub fn folder_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                Node::Bookmark(_) => 0,
                Node::Folder(folder) => 1 + folder.folder_count(),
            })
            .sum()
    }

    /// Direct subfolders.
    pub fn subfolders(&self) -> impl Iterator<Item = &Folder> {
        self.children.iter().filter_map(Node::as_folder)
    }

    /// Direct bookmarks.
    pub fn bookmarks(&self) -> impl Iterator<Item = &Bookmark> {
        self.children.iter().filter_map(Node::as_bookmark)
    }
}

/// A bookmarked URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    /// Bookmark title.
    #[serde(default)]
    pub title: CompactString,

    /// Target URL. Bookmarks with an empty URL are carried along but never analyzed.
    #[serde(default)]
    pub url: String,

    /// Creation time in milliseconds since the Unix epoch (0 = unknown).
    #[serde(default)]
    pub date_added: i64,

    /// Last modification time in milliseconds since the Unix epoch (0 = unknown).
    #[serde(default)]
    pub last_modified: i64,

    /// Favicon, usually a data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// User-assigned tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Bookmark {
    /// Create a bookmark with a title and URL.
    pub fn new(title: impl Into<CompactString>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            date_added: 0,
            last_modified: 0,
            icon: None,
            tags: None,
        }
    }

    /// Set both timestamps.
    pub fn with_timestamps(mut self, date_added: i64, last_modified: i64) -> Self {
        self.date_added = date_added;
        self.last_modified = last_modified;
        self
    }

    /// Set the icon.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Empty-URL bookmarks take no part in validation or categorization.
    pub fn is_inert(&self) -> bool {
        self.url.is_empty()
    }

    /// Check if a non-empty icon is present.
    pub fn has_icon(&self) -> bool {
        self.icon.as_deref().is_some_and(|icon| !icon.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_counts() {
        let folder = Folder::root()
            .with_child(Bookmark::new("a", "https://a.com"))
            .with_child(
                Folder::new("dev")
                    .with_child(Bookmark::new("b", "https://b.com"))
                    .with_child(Folder::new("empty")),
            );

        assert_eq!(folder.bookmark_count(), 2);
        assert_eq!(folder.folder_count(), 2);
        assert_eq!(folder.subfolders().count(), 1);
        assert_eq!(folder.bookmarks().count(), 1);
    }

    #[test]
    fn test_node_json_shape() {
        let node = Node::from(Bookmark::new("Rust", "https://rust-lang.org").with_timestamps(5, 6));
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "bookmark");
        assert_eq!(json["dateAdded"], 5);
        assert_eq!(json["lastModified"], 6);
        assert!(json.get("icon").is_none());
    }

    #[test]
    fn test_inert_bookmark() {
        assert!(Bookmark::new("nothing", "").is_inert());
        assert!(!Bookmark::new("x", "https://x.org").is_inert());
        assert!(!Bookmark::new("x", "https://x.org").with_icon("").has_icon());
    }
}
