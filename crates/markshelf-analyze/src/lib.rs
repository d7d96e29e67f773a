//! Analysis algorithms for markshelf.
//!
//! This crate provides analysis capabilities for bookmark trees:
//!
//! - **Duplicate detection** - Group bookmarks whose normalized URLs match
//! - **Categorization** - Assign bookmarks to categories by domain, title,
//!   path, folder and TLD rules, with optional text clustering
//! - **Statistics** - Domain, date and depth summaries
//!
//! # Duplicate Detection
//!
//! ```rust
//! use markshelf_analyze::DuplicateFinder;
//! use markshelf_core::{Bookmark, Folder};
//!
//! let tree = Folder::root()
//!     .with_child(Bookmark::new("Rust", "https://www.rust-lang.org/"))
//!     .with_child(Bookmark::new("Rust again", "http://rust-lang.org"));
//!
//! let groups = DuplicateFinder::new().find_duplicates(&tree);
//! assert_eq!(groups["https://rust-lang.org"].len(), 2);
//! ```
//!
//! # Categorization
//!
//! ```rust
//! use markshelf_analyze::Categorizer;
//! use markshelf_core::{Bookmark, Folder};
//!
//! let tree = Folder::root()
//!     .with_child(Bookmark::new("ripgrep", "https://github.com/BurntSushi/ripgrep"))
//!     .with_child(Bookmark::new("tokio", "https://github.com/tokio-rs/tokio"));
//!
//! let categories = Categorizer::new().categorize(&tree);
//! assert_eq!(categories["Development"].len(), 2);
//! ```

mod categorize;
mod cluster;
mod duplicates;
pub mod rules;
mod stats;
pub mod text;

pub use categorize::{
    Categorizer, FALLBACK_CLUSTER_NAME, Strategy, filter_and_sort, merge_by_priority,
    name_cluster,
};
pub use cluster::{ClusterError, TextClusterer, TfidfDbscan, TfidfDbscanBuilder};
pub use duplicates::{DuplicateFinder, NoRefinement, TitleRefiner, normalize_url};
pub use rules::{DomainRule, RuleSet};
pub use stats::{BookmarkStats, DomainCount, TOP_DOMAINS};

// Re-export core types
pub use markshelf_core::{CategorizeConfig, Categories, DuplicateConfig, DuplicateGroups};
