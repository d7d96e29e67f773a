//! Deterministic tree ordering.

use markshelf_core::{Folder, Node};

/// Sort a tree in place.
///
/// Within every folder, subfolders come first ordered by lowercased title,
/// followed by bookmarks ordered the same way. Equal titles keep their
/// relative order.
pub fn sort_tree(folder: &mut Folder) {
    let (mut folders, mut bookmarks): (Vec<Node>, Vec<Node>) =
        std::mem::take(&mut folder.children)
            .into_iter()
            .partition(Node::is_folder);

    folders.sort_by_cached_key(|node| node.title().to_lowercase());
    bookmarks.sort_by_cached_key(|node| node.title().to_lowercase());

    for node in &mut folders {
        if let Node::Folder(sub) = node {
            sort_tree(sub);
        }
    }

    folder.children = folders;
    folder.children.append(&mut bookmarks);
}

#[cfg(test)]
mod tests {
    use markshelf_core::Bookmark;

    use super::*;

    fn titles(folder: &Folder) -> Vec<&str> {
        folder.children.iter().map(Node::title).collect()
    }

    #[test]
    fn test_folders_before_bookmarks() {
        let mut tree = Folder::root()
            .with_child(Bookmark::new("beta", "https://b.example"))
            .with_child(Folder::new("zed"))
            .with_child(Bookmark::new("Alpha", "https://a.example"))
            .with_child(Folder::new("Apps").with_child(Bookmark::new("y", "")).with_child(Bookmark::new("X", "")));

        sort_tree(&mut tree);

        assert_eq!(titles(&tree), vec!["Apps", "zed", "Alpha", "beta"]);
        assert_eq!(titles(tree.children[0].as_folder().unwrap()), vec!["X", "y"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_titles() {
        let mut tree = Folder::root()
            .with_child(Bookmark::new("same", "https://1.example"))
            .with_child(Bookmark::new("SAME", "https://2.example"));

        sort_tree(&mut tree);

        let urls: Vec<_> = tree.bookmarks().map(|b| b.url.as_str()).collect();
        assert_eq!(urls, vec!["https://1.example", "https://2.example"]);
    }
}
