//! Netscape bookmark file parsing.
//!
//! Every major browser exports bookmarks in the Netscape format: nested
//! `<DL>` lists where `<DT><H3>` starts a folder and `<DT><A>` is a
//! bookmark. The parser is a tolerant tokenizer over those four tags and
//! ignores everything else (`<p>`, `<DD>` notes, unclosed `<DT>`s).

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::Utc;
use markshelf_core::{Bookmark, BookmarkError, Folder};
use regex::{Captures, Regex};

/// Title given to anchors without text.
pub const UNTITLED: &str = "Untitled Bookmark";

/// Anchors with these schemes are never imported.
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "about:", "chrome:", "edge:", "file:"];

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?P<open>dl)\b[^>]*>|</(?P<close>dl)\s*>|<h3\b(?P<h3>[^>]*)>(?P<folder>.*?)</h3\s*>|<a\b(?P<a>[^>]*)>(?P<link>.*?)</a\s*>")
        .expect("token pattern is a valid regex")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)(?P<name>[A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s"'>]+))"#)
        .expect("attribute pattern is a valid regex")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is a valid regex"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#(?P<dec>[0-9]+)|#[xX](?P<hex>[0-9a-fA-F]+)|(?P<named>[a-zA-Z]+));")
        .expect("entity pattern is a valid regex")
});

/// Parse a Netscape bookmark file into a tree rooted at "Bookmarks".
///
/// Timestamps are converted from seconds to milliseconds. A document with
/// neither a `<DL>` list nor a single anchor is rejected.
pub fn parse_netscape(html: &str) -> Result<Folder, BookmarkError> {
    let root = Folder::root().with_timestamps(Utc::now().timestamp_millis(), 0);
    let mut builder = TreeBuilder::new(root);
    let mut saw_structure = false;

    for caps in TOKEN.captures_iter(html) {
        if caps.name("open").is_some() {
            saw_structure = true;
            builder.open_list();
        } else if caps.name("close").is_some() {
            builder.close_list();
        } else if let Some(attrs) = caps.name("h3") {
            saw_structure = true;
            let attrs = parse_attributes(attrs.as_str());
            let title = text_content(&caps, "folder");
            builder.start_folder(
                Folder::new(title).with_timestamps(
                    timestamp(&attrs, &["add_date"]),
                    timestamp(&attrs, &["last_modified"]),
                ),
            );
        } else if let Some(attrs) = caps.name("a") {
            saw_structure = true;
            let attrs = parse_attributes(attrs.as_str());
            if let Some(bookmark) = bookmark_from_anchor(&attrs, text_content(&caps, "link")) {
                builder.add_bookmark(bookmark);
            }
        }
    }

    if !saw_structure {
        return Err(BookmarkError::parse("No bookmark structure found"));
    }

    let root = builder.finish();
    tracing::debug!(
        bookmarks = root.bookmark_count(),
        folders = root.folder_count(),
        "parsed bookmark file"
    );
    Ok(root)
}

/// Incremental tree construction from the token stream.
///
/// A folder heading waits in `pending` until its `<DL>` opens. Lists that
/// open without a heading are transparent: their items go to the enclosing
/// folder.
struct TreeBuilder {
    root: Folder,
    /// Open lists, `None` for transparent ones.
    open: Vec<Option<Folder>>,
    pending: Option<Folder>,
}

impl TreeBuilder {
    fn new(root: Folder) -> Self {
        Self {
            root,
            open: Vec::new(),
            pending: None,
        }
    }

    fn current(&mut self) -> &mut Folder {
        match self.open.iter_mut().rev().find_map(Option::as_mut) {
            Some(folder) => folder,
            None => &mut self.root,
        }
    }

    /// A heading with no list of its own becomes an empty folder.
    fn flush_pending(&mut self) {
        if let Some(folder) = self.pending.take() {
            self.current().push(folder);
        }
    }

    fn open_list(&mut self) {
        let folder = self.pending.take();
        self.open.push(folder);
    }

    fn close_list(&mut self) {
        self.flush_pending();
        if let Some(Some(folder)) = self.open.pop() {
            self.current().push(folder);
        }
    }

    fn start_folder(&mut self, folder: Folder) {
        self.flush_pending();
        self.pending = Some(folder);
    }

    fn add_bookmark(&mut self, bookmark: Bookmark) {
        self.flush_pending();
        self.current().push(bookmark);
    }

    /// Close whatever the document left open.
    fn finish(mut self) -> Folder {
        self.flush_pending();
        while !self.open.is_empty() {
            self.close_list();
        }
        self.root
    }
}

fn bookmark_from_anchor(attrs: &HashMap<String, String>, title: String) -> Option<Bookmark> {
    let url = attrs.get("href").map(|href| href.trim()).unwrap_or_default();
    if url.is_empty() {
        return None;
    }
    let lowered = url.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        tracing::trace!(url, "skipping non-web anchor");
        return None;
    }

    let title = if title.is_empty() { UNTITLED.to_string() } else { title };
    let mut bookmark = Bookmark::new(title, url).with_timestamps(
        timestamp(attrs, &["add_date", "added"]),
        timestamp(attrs, &["last_modified"]),
    );

    if let Some(icon) = attrs.get("icon").filter(|icon| !icon.is_empty()) {
        bookmark = bookmark.with_icon(icon.clone());
    }
    if let Some(tags) = attrs.get("tags").filter(|tags| !tags.trim().is_empty()) {
        bookmark = bookmark.with_tags(
            tags.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty()),
        );
    }

    Some(bookmark)
}

/// Attributes of a start tag, names lowercased and values decoded.
fn parse_attributes(raw: &str) -> HashMap<String, String> {
    ATTRIBUTE
        .captures_iter(raw)
        .map(|caps| {
            let value = caps
                .name("dq")
                .or_else(|| caps.name("sq"))
                .or_else(|| caps.name("bare"))
                .map(|m| m.as_str())
                .unwrap_or_default();
            (caps["name"].to_ascii_lowercase(), decode_entities(value))
        })
        .collect()
}

/// First of `names` holding a plain number of seconds, in milliseconds.
fn timestamp(attrs: &HashMap<String, String>, names: &[&str]) -> i64 {
    let Some(value) = names.iter().find_map(|name| attrs.get(*name)) else {
        return 0;
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| secs.checked_mul(1000))
        .unwrap_or(0)
}

/// Inner text of an element with nested tags removed.
fn text_content(caps: &Captures<'_>, group: &str) -> String {
    let inner = caps.name(group).map(|m| m.as_str()).unwrap_or_default();
    decode_entities(&TAG.replace_all(inner, ""))
        .trim()
        .to_string()
}

/// Decode character references. Unknown named entities are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let decoded = if let Some(dec) = caps.name("dec") {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else if let Some(hex) = caps.name("hex") {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else {
                caps.name("named").and_then(|name| named_entity(name.as_str()))
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => return None,
    })
}
