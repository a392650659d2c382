//! Markdown to HTML conversion for derived pages.
//!
//! The conversion is pluggable through [`MarkupTransform`]; the default
//! [`CommonMarkTransform`] uses pulldown-cmark. The result is wrapped in a
//! minimal HTML envelope without any styling; pages are styled through the
//! user style sheet instead.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Boxed error returned by a transform.
pub type TransformError = Box<dyn std::error::Error + Send + Sync>;

const HTML_PREFIX: &str =
    "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title></title></head><body>";
const HTML_SUFFIX: &str = "</body></html>";

/// Converts markup source into an HTML fragment.
pub trait MarkupTransform: fmt::Debug + Send + Sync {
    /// Convert `source` into HTML body content.
    fn transform(&self, source: &[u8]) -> Result<Vec<u8>, TransformError>;
}

/// CommonMark with tables, footnotes, strikethrough and task lists.
///
/// Headings get generated `id` attributes and links to absolute URLs open in
/// a new target.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMarkTransform;

impl CommonMarkTransform {
    /// Create the default transform.
    pub fn new() -> Self {
        Self
    }

    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        options
    }
}

impl MarkupTransform for CommonMarkTransform {
    fn transform(&self, source: &[u8]) -> Result<Vec<u8>, TransformError> {
        let text = String::from_utf8_lossy(source);
        let events: Vec<Event<'_>> = Parser::new_ext(&text, Self::options()).collect();
        let events = open_external_links_in_new_target(assign_heading_ids(events));

        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        Ok(out.into_bytes())
    }
}

/// Strip, convert and wrap a markdown source into a complete HTML document.
pub fn render_document(
    source: &[u8],
    skip_title_block: bool,
    transform: &dyn MarkupTransform,
) -> Result<Vec<u8>, TransformError> {
    let body = if skip_title_block {
        strip_title_block(source)
    } else {
        source
    };

    let html = transform.transform(body)?;
    let mut doc = Vec::with_capacity(HTML_PREFIX.len() + html.len() + HTML_SUFFIX.len());
    doc.extend_from_slice(HTML_PREFIX.as_bytes());
    doc.extend_from_slice(&html);
    doc.extend_from_slice(HTML_SUFFIX.as_bytes());
    Ok(doc)
}

/// Remove the leading `# Title` / `## Subtitle` block.
///
/// - H1 followed (blank lines allowed) by an H2: both headings and the blank
///   lines between them are removed.
/// - H1 followed by other content: the H1 and the blank lines after it are
///   removed.
/// - No H1, or nothing but blank lines after it: the source is kept whole.
///
/// When the block is removed, anything before the H1 goes with it.
pub fn strip_title_block(source: &[u8]) -> &[u8] {
    let mut offset = 0;
    let mut seen_title = false;

    for line in source.split_inclusive(|b| *b == b'\n') {
        let end = offset + line.len();
        let text = String::from_utf8_lossy(line);
        let trimmed = text.trim();

        if !seen_title {
            seen_title = trimmed.starts_with("# ");
        } else if trimmed.starts_with("## ") {
            return &source[end..];
        } else if !trimmed.is_empty() {
            return &source[offset..];
        }
        offset = end;
    }

    if seen_title {
        log::warn!("title block has no content after it; keeping the source unchanged");
    }
    source
}

fn slug_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid slug regex"))
}

fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    slug_separator()
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

fn assign_heading_ids(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut i = 0;

    while i < events.len() {
        let needs_id = matches!(&events[i], Event::Start(Tag::Heading { id: None, .. }));
        if needs_id {
            let mut text = String::new();
            for event in &events[i + 1..] {
                match event {
                    Event::End(TagEnd::Heading(_)) => break,
                    Event::Text(t) | Event::Code(t) => text.push_str(t),
                    _ => {}
                }
            }

            let base = slugify(&text);
            if !base.is_empty() {
                let count = seen.entry(base.clone()).or_insert(0);
                let slug = if *count == 0 {
                    base
                } else {
                    format!("{}-{}", base, count)
                };
                *count += 1;

                if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                    *id = Some(CowStr::from(slug));
                }
            }
        }
        i += 1;
    }

    events
}

fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn open_external_links_in_new_target(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut rewritten = Vec::new();
    let mut out = Vec::with_capacity(events.len());

    for event in events {
        match event {
            Event::Start(Tag::Link {
                ref dest_url,
                ref title,
                ..
            }) if is_external(dest_url) => {
                let mut tag = format!("<a href=\"{}\"", escape_attr(dest_url));
                if !title.is_empty() {
                    tag.push_str(&format!(" title=\"{}\"", escape_attr(title)));
                }
                tag.push_str(" target=\"_blank\">");
                rewritten.push(true);
                out.push(Event::InlineHtml(CowStr::from(tag)));
            }
            Event::Start(Tag::Link { .. }) => {
                rewritten.push(false);
                out.push(event);
            }
            Event::End(TagEnd::Link) => {
                if rewritten.pop().unwrap_or(false) {
                    out.push(Event::InlineHtml(CowStr::Borrowed("</a>")));
                } else {
                    out.push(event);
                }
            }
            other => out.push(other),
        }
    }

    out
}
