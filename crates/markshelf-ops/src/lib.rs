//! Tree rewriting for markshelf.
//!
//! Every operation takes a tree by reference and returns a new one:
//!
//! - [`Organizer`] rebuilds the hierarchy around a category mapping,
//!   splitting oversized categories into subfolders
//! - [`remove_broken_links`] drops bookmarks a link check reported
//! - [`merge_duplicates`] keeps one bookmark per duplicate group
//! - [`sort_tree`] orders a tree deterministically
//!
//! ```rust
//! use markshelf_core::{Bookmark, Categories, Folder, OrganizeConfig, flatten};
//! use markshelf_ops::Organizer;
//!
//! let tree = Folder::root()
//!     .with_child(Bookmark::new("tokio", "https://tokio.rs"))
//!     .with_child(Bookmark::new("news", "https://news.example"));
//!
//! let mut categories = Categories::new();
//! categories.insert("Rust".to_string(), flatten(&tree)[..1].to_vec());
//!
//! let organizer = Organizer::with_config(OrganizeConfig {
//!     max_per_folder: 50,
//!     preserve_existing: false,
//! });
//! let organized = organizer.organize(&tree, &categories);
//!
//! assert_eq!(organized.children[0].title(), "Rust");
//! assert_eq!(organized.children[1].title(), "Uncategorized");
//! ```

mod cleanup;
mod organize;
mod sort;
mod subfolders;

pub use cleanup::{choose_survivor, merge_duplicates, remove_broken_links, survivor_score};
pub use organize::{Organizer, UNCATEGORIZED};
pub use sort::sort_tree;
pub use subfolders::{NON_LETTER_BUCKET, Subfolders, split_into_subfolders};
