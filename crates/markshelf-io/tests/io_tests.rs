use markshelf_core::{BookmarkError, Folder, flatten};
use markshelf_io::{
    ExportConfig, ExportFormat, HtmlFlavor, export_csv, export_html, parse_netscape, read_tree,
    write_tree,
};
use strum::IntoEnumIterator;

const FIREFOX_EXPORT: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<!-- This is an automatically generated file.
     It will be read and overwritten.
     DO NOT EDIT! -->
<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">
<meta http-equiv="Content-Security-Policy" content="default-src 'self'; script-src 'none'">
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks Menu</H1>

<DL><p>
    <DT><H3 ADD_DATE="1700000000" LAST_MODIFIED="1700000900">Reading</H3>
    <DL><p>
        <DT><A HREF="https://blog.rust-lang.org/" ADD_DATE="1700000100" LAST_MODIFIED="1700000200" ICON="data:image/png;base64,iVBORw0KGgo=" TAGS="rust,news">Rust Blog</A>
        <DD>Release announcements
        <DT><H3 ADD_DATE="1700000300" LAST_MODIFIED="1700000400">Papers &amp; Notes</H3>
        <DL><p>
            <DT><A HREF="https://arxiv.org/abs/1706.03762" ADD_DATE="1700000500">Attention Is All You Need</A>
        </DL><p>
    </DL><p>
    <DT><A HREF="place:type=6&amp;sort=14&amp;maxResults=10">Recent Tags</A>
    <DT><A HREF="about:config">Config</A>
    <DT><A HREF="https://news.ycombinator.com/" ADD_DATE="1700000600">Hacker News</A>
</DL>
"#;

fn fixture() -> Folder {
    parse_netscape(FIREFOX_EXPORT).unwrap()
}

#[test]
fn test_parse_firefox_export() {
    let tree = fixture();
    let flat = flatten(&tree);

    let titles: Vec<&str> = flat.iter().map(|b| b.title()).collect();
    assert_eq!(
        titles,
        vec!["Rust Blog", "Attention Is All You Need", "Recent Tags", "Hacker News"]
    );
    assert_eq!(flat[1].display_path(), "Reading/Papers & Notes");
    assert_eq!(flat[2].url(), "place:type=6&sort=14&maxResults=10");
    assert_eq!(tree.folder_count(), 2);
}

#[test]
fn test_html_round_trip_preserves_tree() {
    let tree = fixture();

    for flavor in HtmlFlavor::iter() {
        let html = export_html(&tree, flavor);
        let back = parse_netscape(&html).unwrap();
        assert_eq!(back.children, tree.children, "{flavor}");
    }
}

#[test]
fn test_json_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("tree.json");
    let tree = fixture();

    write_tree(&path, &tree, &ExportConfig::for_format(ExportFormat::Json)).unwrap();
    let back = read_tree(&path).unwrap();

    assert_eq!(back, tree);
}

#[test]
fn test_html_file_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmarks.html");
    let tree = fixture();

    let config = ExportConfig::builder()
        .flavor(HtmlFlavor::Safari)
        .build()
        .unwrap();
    write_tree(&path, &tree, &config).unwrap();

    let back = read_tree(&path).unwrap();
    assert_eq!(back.children, tree.children);
}

#[test]
fn test_csv_has_one_row_per_bookmark() {
    let tree = fixture();
    let csv = export_csv(&tree, true);

    assert_eq!(csv.lines().count(), tree.bookmark_count() + 1);
    assert!(csv.contains("Reading/Papers & Notes"));
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_tree(&dir.path().join("missing.html")).unwrap_err();
    assert!(matches!(err, BookmarkError::NotFound { .. }));
}

#[test]
fn test_garbage_file_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let html = dir.path().join("notes.html");
    std::fs::write(&html, "just some text").unwrap();
    assert!(matches!(read_tree(&html).unwrap_err(), BookmarkError::Parse { .. }));

    let json = dir.path().join("broken.json");
    std::fs::write(&json, "{ not json").unwrap();
    assert!(matches!(read_tree(&json).unwrap_err(), BookmarkError::Json(_)));
}

#[test]
fn test_format_from_path() {
    use std::path::Path;

    assert_eq!(ExportFormat::from_path(Path::new("out.HTM")), Some(ExportFormat::Html));
    assert_eq!(ExportFormat::from_path(Path::new("out.csv")), Some(ExportFormat::Csv));
    assert_eq!(ExportFormat::from_path(Path::new("out")), None);
}
