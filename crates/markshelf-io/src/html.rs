//! Netscape bookmark file export.

use std::fmt::{self, Write};

use markshelf_core::{Bookmark, Folder, Node};
use strum::{Display, EnumIter, EnumString};

/// Browser whose import dialect the exported file targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum HtmlFlavor {
    /// Chrome and Edge.
    #[default]
    #[strum(to_string = "chrome", serialize = "edge")]
    Chrome,
    #[strum(to_string = "firefox")]
    Firefox,
    /// Plain HTML5 document wrapper.
    #[strum(to_string = "safari")]
    Safari,
    /// Minimal Netscape header most browsers accept.
    #[strum(to_string = "generic")]
    Generic,
}

const NETSCAPE_DOCTYPE: &str = "<!DOCTYPE NETSCAPE-Bookmark-file-1>";
const GENERATED_NOTICE: &str = "<!-- This is an automatically generated file.\n     It will be read and overwritten.\n     DO NOT EDIT! -->";
const META_CHARSET: &str =
    r#"<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">"#;

/// Render a tree as a Netscape bookmark file.
///
/// The root folder itself is not written, only its children.
pub fn export_html(root: &Folder, flavor: HtmlFlavor) -> String {
    let mut out = String::new();
    let _ = write_html(&mut out, root, flavor);
    out
}

/// Write a tree as a Netscape bookmark file.
pub fn write_html<W: Write>(out: &mut W, root: &Folder, flavor: HtmlFlavor) -> fmt::Result {
    write_header(out, flavor)?;
    for child in &root.children {
        write_node(out, child, 1)?;
    }
    writeln!(out, "</DL><p>")?;
    if flavor == HtmlFlavor::Safari {
        writeln!(out, "</body>\n</html>")?;
    }
    Ok(())
}

fn write_header<W: Write>(out: &mut W, flavor: HtmlFlavor) -> fmt::Result {
    match flavor {
        HtmlFlavor::Chrome | HtmlFlavor::Firefox => {
            let heading = if flavor == HtmlFlavor::Firefox {
                "Bookmarks Menu"
            } else {
                "Bookmarks"
            };
            writeln!(out, "{NETSCAPE_DOCTYPE}")?;
            writeln!(out, "{GENERATED_NOTICE}")?;
            writeln!(out, "{META_CHARSET}")?;
            writeln!(out, "<TITLE>Bookmarks</TITLE>")?;
            writeln!(out, "<H1>{heading}</H1>")?;
            writeln!(out, "<DL><p>")
        }
        HtmlFlavor::Safari => {
            writeln!(out, "<!DOCTYPE html>")?;
            writeln!(out, "<html>\n<head>")?;
            writeln!(out, "    <meta charset=\"UTF-8\">")?;
            writeln!(out, "    <title>Bookmarks</title>")?;
            writeln!(out, "</head>\n<body>")?;
            writeln!(out, "<h1>Bookmarks</h1>")?;
            writeln!(out, "<dl><p>")
        }
        HtmlFlavor::Generic => {
            writeln!(out, "{NETSCAPE_DOCTYPE}")?;
            writeln!(out, "{META_CHARSET}")?;
            writeln!(out, "<TITLE>Bookmarks</TITLE>")?;
            writeln!(out, "<H1>Bookmarks</H1>")?;
            writeln!(out, "<DL><p>")
        }
    }
}

fn write_node<W: Write>(out: &mut W, node: &Node, depth: usize) -> fmt::Result {
    match node {
        Node::Folder(folder) => write_folder(out, folder, depth),
        Node::Bookmark(bookmark) => write_bookmark(out, bookmark, depth),
    }
}

fn write_folder<W: Write>(out: &mut W, folder: &Folder, depth: usize) -> fmt::Result {
    let indent = "    ".repeat(depth);
    writeln!(
        out,
        r#"{indent}<DT><H3 ADD_DATE="{}" LAST_MODIFIED="{}">{}</H3>"#,
        folder.date_added / 1000,
        folder.last_modified / 1000,
        escape_html(&folder.title)
    )?;
    writeln!(out, "{indent}<DL><p>")?;
    for child in &folder.children {
        write_node(out, child, depth + 1)?;
    }
    writeln!(out, "{indent}</DL><p>")
}

fn write_bookmark<W: Write>(out: &mut W, bookmark: &Bookmark, depth: usize) -> fmt::Result {
    let indent = "    ".repeat(depth);
    let added = bookmark.date_added / 1000;
    let modified = bookmark.last_modified / 1000;

    write!(
        out,
        r#"{indent}<DT><A HREF="{}" ADD_DATE="{added}""#,
        escape_html(&bookmark.url)
    )?;
    if let Some(icon) = bookmark.icon.as_deref().filter(|icon| !icon.is_empty()) {
        write!(out, r#" ICON="{}""#, escape_html(icon))?;
    }
    if modified != 0 && modified != added {
        write!(out, r#" LAST_MODIFIED="{modified}""#)?;
    }
    if let Some(tags) = bookmark.tags.as_ref().filter(|tags| !tags.is_empty()) {
        write!(out, r#" TAGS="{}""#, escape_html(&tags.join(",")))?;
    }

    let title = if bookmark.title.is_empty() {
        bookmark.url.as_str()
    } else {
        bookmark.title.as_str()
    };
    writeln!(out, ">{}</A>", escape_html(title))
}

/// Escape the five HTML special characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn tree() -> Folder {
        Folder::root().with_child(
            Folder::new("Dev <stuff>")
                .with_timestamps(1_600_000_000_000, 1_600_000_500_000)
                .with_child(
                    Bookmark::new("Q&A", "https://example.com/?a=1&b=2")
                        .with_timestamps(1_600_000_001_000, 1_600_000_001_000)
                        .with_tags(["x", "y"]),
                ),
        )
    }

    #[test]
    fn test_flavor_names() {
        assert_eq!(HtmlFlavor::from_str("Edge").unwrap(), HtmlFlavor::Chrome);
        assert_eq!(HtmlFlavor::from_str("firefox").unwrap(), HtmlFlavor::Firefox);
        assert_eq!(HtmlFlavor::Chrome.to_string(), "chrome");
        assert!(HtmlFlavor::from_str("lynx").is_err());
    }

    #[test]
    fn test_export_escapes_and_formats() {
        let html = export_html(&tree(), HtmlFlavor::Chrome);

        assert!(html.starts_with(NETSCAPE_DOCTYPE));
        assert!(html.contains(
            r#"    <DT><H3 ADD_DATE="1600000000" LAST_MODIFIED="1600000500">Dev &lt;stuff&gt;</H3>"#
        ));
        assert!(html.contains(
            r#"        <DT><A HREF="https://example.com/?a=1&amp;b=2" ADD_DATE="1600000001" TAGS="x,y">Q&amp;A</A>"#
        ));
        assert!(html.trim_end().ends_with("</DL><p>"));
    }

    #[test]
    fn test_flavor_headers() {
        let firefox = export_html(&tree(), HtmlFlavor::Firefox);
        assert!(firefox.contains("<H1>Bookmarks Menu</H1>"));

        let safari = export_html(&tree(), HtmlFlavor::Safari);
        assert!(safari.starts_with("<!DOCTYPE html>"));
        assert!(safari.trim_end().ends_with("</html>"));

        let generic = export_html(&tree(), HtmlFlavor::Generic);
        assert!(!generic.contains("DO NOT EDIT"));
    }
}
