//! Integration tests for argument assembly and page defaults.

use wkpdf::options::{BoolOption, FloatOption, ListOption, MapOption, StringOption, UintOption};
use wkpdf::{Document, Error, LocatedPage, Orientation, Page, PageSize, PageSource, StreamPage};

#[test]
fn test_letter_page_with_margin() {
    let mut doc = Document::new();
    doc.global.page_size.set(PageSize::Letter);
    doc.global.margin_top_unit.set("25mm");
    doc.add_page(Page::located("https://example.com"));

    let args = doc.args();
    assert_eq!(
        &args[..6],
        [
            "--page-size",
            "Letter",
            "--margin-top",
            "25mm",
            "page",
            "https://example.com"
        ]
    );
    assert_eq!(args.last().map(String::as_str), Some("-"));
}

#[test]
fn test_args_idempotent() {
    let mut doc = Document::new();
    doc.global.orientation.set(Orientation::Landscape);
    doc.global.copies.set(2);
    doc.toc.include = true;
    doc.toc.toc.disable_dotted_lines.set(true);
    doc.set_cover("cover.html");
    doc.set_replace("title", "Report");
    doc.add_page(Page::located("a.html"));
    doc.add_page(StreamPage::new("<p>b</p>"));

    let first = doc.args();
    let second = doc.args();
    assert_eq!(first, second);
    assert_eq!(doc.arg_string(), first.join(" "));
}

#[test]
fn test_unset_clears_every_kind() {
    let mut s = StringOption::new("title");
    s.set("a");
    s.set("b");
    s.unset();
    assert!(s.parse().is_empty());

    let mut u = UintOption::new("dpi");
    u.set(72);
    u.unset();
    assert!(u.parse().is_empty());

    let mut f = FloatOption::new("zoom");
    f.set(1.25);
    f.unset();
    assert!(f.parse().is_empty());

    let mut b = BoolOption::new("grayscale");
    b.set(true);
    b.unset();
    assert!(b.parse().is_empty());

    let mut l = ListOption::new("allow");
    l.set("/a");
    l.set("/b");
    l.unset();
    assert!(l.parse().is_empty());

    let mut m = MapOption::new("cookie");
    m.set("k", "v");
    m.unset();
    assert!(m.parse().is_empty());
}

#[test]
fn test_defaults_only_fill_unset_options() {
    let mut doc = Document::new();
    doc.set_user_style_sheet("global.css");
    doc.set_header_html("global-header.html");
    doc.set_footer_html("global-footer.html");

    let mut own = LocatedPage::new("own.html");
    own.settings.options.user_style_sheet.set("own.css");
    own.settings.header_footer.footer_html.set("own-footer.html");
    doc.add_page(own);
    doc.add_page(Page::located("plain.html"));

    let own = doc.pages()[0].settings();
    assert_eq!(own.options.user_style_sheet.value().unwrap(), "own.css");
    assert_eq!(
        own.header_footer.header_html.value().unwrap(),
        "global-header.html"
    );
    assert_eq!(
        own.header_footer.footer_html.value().unwrap(),
        "own-footer.html"
    );

    let plain = doc.pages()[1].settings();
    assert_eq!(plain.options.user_style_sheet.value().unwrap(), "global.css");
    assert_eq!(
        plain.header_footer.footer_html.value().unwrap(),
        "global-footer.html"
    );
}

#[test]
fn test_page_replacements_win_over_defaults() {
    let mut doc = Document::new();
    doc.set_replace("author", "Global Author");
    doc.set_replace("company", "ACME");

    let mut page = LocatedPage::new("a.html");
    page.settings.header_footer.replace.set("author", "Page Author");
    doc.add_page(page);

    assert_eq!(
        doc.arg_string(),
        "page a.html --replace author Page Author --replace company ACME -"
    );
}

#[test]
fn test_duplicate_global_flag_fails() {
    let mut doc = Document::new();
    doc.global.page_width.set(210);
    doc.global.page_width_unit.set("210mm");
    doc.add_page(Page::located("a.html"));

    match doc.check_duplicate_flags() {
        Err(Error::DuplicateArgument(flag)) => assert_eq!(flag, "--page-width"),
        other => panic!("expected duplicate argument, got {:?}", other),
    }
}

#[test]
fn test_flag_repeated_in_page_group_is_allowed() {
    let mut doc = Document::new();
    doc.global.title.set("Report");
    doc.set_header_html("header.html");

    let mut page = LocatedPage::new("a.html");
    page.settings.options.run_script.set("console.log(1)");
    page.settings.options.run_script.set("console.log(2)");
    page.settings.options.cookie.set("session", "abc");
    doc.add_page(page);
    doc.add_page(Page::located("b.html"));

    assert!(doc.check_duplicate_flags().is_ok());
    let header_flags = doc
        .args()
        .iter()
        .filter(|a| a.as_str() == "--header-html")
        .count();
    assert_eq!(header_flags, 2);
}

#[test]
fn test_two_stream_pages_still_build() {
    let mut doc = Document::new();
    doc.add_page(StreamPage::new("<p>one</p>"));
    doc.add_page(StreamPage::new("<p>two</p>"));

    assert!(doc.check_duplicate_flags().is_ok());
    assert_eq!(doc.args(), vec!["page", "-", "page", "-", "-"]);
}

#[test]
fn test_output_file_replaces_sentinel() {
    let mut doc = Document::new().with_output_file("report.pdf");
    doc.add_page(Page::located("a.html"));
    assert_eq!(doc.args(), vec!["page", "a.html", "report.pdf"]);

    doc.set_output_buffer();
    assert_eq!(doc.args().last().map(String::as_str), Some("-"));
}

#[test]
fn test_page_mut_changes_args() {
    let mut doc = Document::new();
    doc.add_page(Page::located("a.html"));
    doc.page_mut(0)
        .unwrap()
        .settings_mut()
        .options
        .disable_javascript
        .set(true);

    assert_eq!(doc.args(), vec!["page", "a.html", "--disable-javascript", "-"]);
    assert!(doc.page_mut(5).is_none());
}
