//! Bookmark file import and export for markshelf.
//!
//! Reading:
//!
//! - Netscape bookmark HTML, as exported by every major browser
//! - The JSON form of [`Folder`]
//!
//! Writing adds a flat CSV format on top of those two.
//!
//! # Example
//!
//! ```rust
//! use markshelf_io::{HtmlFlavor, export_html, parse_netscape};
//!
//! let html = r#"<DL><p>
//!     <DT><A HREF="https://www.rust-lang.org/" ADD_DATE="1600000000">Rust</A>
//! </DL><p>"#;
//!
//! let tree = parse_netscape(html).unwrap();
//! assert_eq!(tree.bookmark_count(), 1);
//!
//! let again = parse_netscape(&export_html(&tree, HtmlFlavor::Firefox)).unwrap();
//! assert_eq!(again.children, tree.children);
//! ```

mod csv;
mod html;
mod json;
mod netscape;

use std::path::Path;

use derive_builder::Builder;
use strum::{Display, EnumIter, EnumString};

pub use csv::{export_csv, format_timestamp};
pub use html::{HtmlFlavor, escape_html, export_html, write_html};
pub use json::{export_json, parse_json};
pub use netscape::{UNTITLED, decode_entities, parse_netscape};

// Re-export core types
pub use markshelf_core::{BookmarkError, Folder};

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    /// Netscape bookmark HTML.
    #[default]
    Html,
    /// Lossless tree JSON.
    Json,
    /// One row per bookmark.
    Csv,
}

impl ExportFormat {
    /// Format implied by a file extension, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" => Some(Self::Html),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Options for writing a tree to a file.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ExportConfig {
    /// Output format.
    #[builder(default)]
    pub format: ExportFormat,

    /// Browser dialect for HTML output.
    #[builder(default)]
    pub flavor: HtmlFlavor,

    /// Include the folder path column in CSV output.
    #[builder(default = "true")]
    pub include_folders: bool,
}

impl ExportConfig {
    /// Create a new config builder.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::default()
    }

    /// Default options for a format.
    pub fn for_format(format: ExportFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Html,
            flavor: HtmlFlavor::Chrome,
            include_folders: true,
        }
    }
}

/// Render a tree in the configured format.
pub fn export(root: &Folder, config: &ExportConfig) -> Result<String, BookmarkError> {
    match config.format {
        ExportFormat::Html => Ok(export_html(root, config.flavor)),
        ExportFormat::Json => export_json(root),
        ExportFormat::Csv => Ok(export_csv(root, config.include_folders)),
    }
}

/// Read a bookmark tree from a file.
///
/// Files ending in `.json` are read as tree JSON, everything else as a
/// Netscape bookmark file.
pub fn read_tree(path: &Path) -> Result<Folder, BookmarkError> {
    let text = std::fs::read_to_string(path).map_err(|e| BookmarkError::io(path, e))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    tracing::debug!(path = %path.display(), json = is_json, "reading bookmarks");
    if is_json {
        parse_json(&text)
    } else {
        parse_netscape(&text)
    }
}

/// Write a tree to a file, creating missing parent directories.
pub fn write_tree(path: &Path, root: &Folder, config: &ExportConfig) -> Result<(), BookmarkError> {
    let contents = export(root, config)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BookmarkError::io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| BookmarkError::io(path, e))?;

    tracing::info!(path = %path.display(), format = %config.format, "wrote bookmarks");
    Ok(())
}
