//! JSON import and export.
//!
//! The JSON form is the serde representation of [`Folder`], so a tree
//! survives a round trip unchanged.

use markshelf_core::{BookmarkError, Folder};

/// Pretty-printed JSON for a tree.
pub fn export_json(root: &Folder) -> Result<String, BookmarkError> {
    Ok(serde_json::to_string_pretty(root)?)
}

/// Parse a tree from its JSON form.
pub fn parse_json(text: &str) -> Result<Folder, BookmarkError> {
    Ok(serde_json::from_str(text)?)
}
