//! Integration tests for the JSON interchange format.

use std::fs;
use tempfile::TempDir;
use wkpdf::{
    from_json, from_reader, to_json, DerivedPage, Document, Error, JsonFormat, LocatedPage, Page,
    PageSize, PageSource, StreamPage,
};

fn configured_document() -> Document {
    let mut doc = Document::new();
    doc.global.page_size.set(PageSize::Legal);
    doc.global.grayscale.set(true);
    doc.global.image_quality.set(80);
    doc.outline.outline_depth.set(4);
    doc.set_cover("cover.html");
    doc.cover.options.zoom.set(1.1);
    doc.toc.include = true;
    doc.toc.toc.toc_header_text.set("Inhalt");
    doc.toc.header_footer.footer_center.set("[page]");
    doc.set_footer_html("footer.html");
    doc.set_replace("author", "Jane");

    let mut located = LocatedPage::new("https://example.com/a");
    located.settings.options.allow.set("/srv/assets");
    located.settings.options.custom_header.set("X-Token", "abc");
    doc.add_page(located);
    doc.add_page(StreamPage::new(vec![0u8, 159, 146, 150, b'<']));
    doc
}

#[test]
fn test_round_trip_reproduces_args() {
    let doc = configured_document();

    for format in [JsonFormat::Pretty, JsonFormat::Compact] {
        let json = to_json(&doc, format).unwrap();
        let back = from_json(&json).unwrap();
        assert_eq!(back.args(), doc.args());
        assert_eq!(back.cover, doc.cover);
        assert_eq!(back.toc, doc.toc);
    }
}

#[test]
fn test_stream_content_survives_round_trip() {
    let doc = configured_document();
    let json = to_json(&doc, JsonFormat::Compact).unwrap();
    let back = from_reader(json.as_bytes()).unwrap();

    assert_eq!(back.pages()[0].kind(), "located");
    assert!(back.pages()[0].content().is_none());
    assert_eq!(
        back.pages()[1].content().unwrap().unwrap(),
        &[0u8, 159, 146, 150, b'<']
    );
}

#[test]
fn test_derived_page_reloads_from_source() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chapter.md");
    fs::write(&path, "# Chapter\n\n## One\n\nFirst version\n").unwrap();

    let mut doc = Document::new();
    doc.add_page(DerivedPage::new(&path).skip_title_block(true));
    let json = to_json(&doc, JsonFormat::Pretty).unwrap();
    assert!(json.contains("\"skipTitleBlock\": true"));
    assert!(json.contains("\"data\""));

    // the embedded copy is ignored; the source is read again
    fs::write(&path, "# Chapter\n\n## One\n\nSecond version\n").unwrap();
    let back = from_json(&json).unwrap();
    assert_eq!(back.args(), doc.args());

    let html = String::from_utf8(back.pages()[0].content().unwrap().unwrap().to_vec()).unwrap();
    assert!(html.contains("Second version"));
    assert!(!html.contains("Chapter"));
}

#[test]
fn test_derived_page_with_missing_source() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gone.md");
    fs::write(&path, "text").unwrap();

    let mut doc = Document::new();
    doc.add_page(Page::derived(&path));
    let json = to_json(&doc, JsonFormat::Compact).unwrap();
    fs::remove_file(&path).unwrap();

    // reload succeeds; the failure shows up when the content is used
    let back = from_json(&json).unwrap();
    assert!(matches!(
        back.pages()[0].content(),
        Some(Err(Error::ContentRead(_)))
    ));
}

#[test]
fn test_serializing_unreadable_derived_page_fails() {
    let mut doc = Document::new();
    doc.add_page(Page::derived("/nonexistent/chapter.md"));
    assert!(matches!(
        to_json(&doc, JsonFormat::Compact),
        Err(Error::ContentRead(_))
    ));
}

#[test]
fn test_derived_page_without_source_is_rejected() {
    let json = to_json(&Document::new(), JsonFormat::Compact).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["pages"] = serde_json::json!([{ "type": "derived", "input": "-" }]);

    match from_json(&value.to_string()) {
        Err(Error::Interchange(message)) => assert!(message.contains("source")),
        other => panic!("expected interchange error, got {:?}", other.map(|d| d.args())),
    }
}

#[test]
fn test_malformed_json() {
    assert!(matches!(from_json("{not json"), Err(Error::Interchange(_))));
    assert!(matches!(from_json("[]"), Err(Error::Interchange(_))));
}

#[test]
fn test_defaults_are_not_reapplied_on_load() {
    let mut doc = Document::new();
    doc.add_page(Page::located("a.html"));
    doc.set_user_style_sheet("late.css");

    let back = from_json(&to_json(&doc, JsonFormat::Compact).unwrap()).unwrap();
    assert_eq!(back.args(), vec!["page", "a.html", "-"]);
}
