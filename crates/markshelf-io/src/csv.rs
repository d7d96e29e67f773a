//! Flat CSV export.
//!
//! CSV loses the folder structure except for a path column, so this is an
//! export-only format.

use chrono::DateTime;
use markshelf_core::{FlatBookmark, Folder, flatten};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render every bookmark of a tree as one CSV row, with a header.
///
/// Columns are `title,url,folder_path,date_added,last_modified,tags`;
/// `folder_path` is left out unless `include_folders` is set. Timestamps
/// are written in UTC, empty when unknown.
pub fn export_csv(root: &Folder, include_folders: bool) -> String {
    let mut out = String::new();

    let header: &[&str] = if include_folders {
        &["title", "url", "folder_path", "date_added", "last_modified", "tags"]
    } else {
        &["title", "url", "date_added", "last_modified", "tags"]
    };
    push_row(&mut out, header.iter().map(|s| s.to_string()));

    for item in flatten(root) {
        push_row(&mut out, row(&item, include_folders));
    }
    out
}

fn row(item: &FlatBookmark, include_folders: bool) -> Vec<String> {
    let bookmark = &item.bookmark;
    let mut fields = vec![bookmark.title.to_string(), bookmark.url.clone()];
    if include_folders {
        fields.push(item.display_path());
    }
    fields.push(format_timestamp(bookmark.date_added));
    fields.push(format_timestamp(bookmark.last_modified));
    fields.push(bookmark.tags.as_ref().map(|tags| tags.join(",")).unwrap_or_default());
    fields
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&quote(&field));
    }
    out.push('\n');
}

/// Quote a field when it holds a separator, quote or line break.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Milliseconds since the epoch as `YYYY-MM-DD HH:MM:SS`, empty for 0.
pub fn format_timestamp(millis: i64) -> String {
    if millis == 0 {
        return String::new();
    }
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}
