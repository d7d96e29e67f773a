//! Core types for markshelf.
//!
//! This crate provides the bookmark tree model shared by every other
//! markshelf crate: folder and bookmark nodes, the canonical flattening
//! traversal, URL helpers, error types and configuration.

mod config;
mod error;
mod node;
mod records;
mod tree;
pub mod urls;

pub use config::{
    CategorizeConfig, CategorizeConfigBuilder, CheckConfig, CheckConfigBuilder, DEFAULT_USER_AGENT,
    DuplicateConfig, DuplicateConfigBuilder, OrganizeConfig, OrganizeConfigBuilder, RuleEntry,
    Settings,
};
pub use error::BookmarkError;
pub use node::{Bookmark, Folder, Node};
pub use records::{BrokenLink, Categories, DuplicateGroups, LinkStatus};
pub use tree::{FlatBookmark, TreeCounts, count_nodes, flatten, retain_bookmarks};

/// Conventional title of the root folder.
pub const ROOT_TITLE: &str = "Bookmarks";
