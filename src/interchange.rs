//! JSON interchange for documents.
//!
//! A document is saved with its option groups, cover, toc and pages. Content
//! of stream and derived pages is embedded as base64; located pages only keep
//! their locator. On reload, derived pages are rebuilt from their source file
//! and the embedded content is ignored.

use crate::document::{Cover, Document, Toc};
use crate::error::{Error, Result};
use crate::options::{GlobalOptions, OutlineOptions, PageSettings};
use crate::page::{DerivedPage, LocatedPage, Page, PageSource, StreamPage, STDIN_SENTINEL};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

const LOCATED: &str = "located";
const STREAM: &str = "stream";
const DERIVED: &str = "derived";

#[derive(Debug, Serialize, Deserialize)]
struct DocumentRecord {
    global: GlobalOptions,
    outline: OutlineOptions,
    cover: Cover,
    toc: Toc,
    #[serde(default)]
    pages: Vec<PageRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageRecord {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "is_false")]
    skip_title_block: bool,
    #[serde(default)]
    settings: PageSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl PageRecord {
    fn capture(page: &Page) -> Result<Self> {
        let data = match page.content() {
            Some(content) => Some(STANDARD.encode(content?)),
            None => None,
        };
        let (source, skip_title_block) = match page {
            Page::Derived(derived) => (
                Some(derived.source().to_path_buf()),
                derived.skips_title_block(),
            ),
            _ => (None, false),
        };

        Ok(Self {
            kind: page.kind().to_string(),
            input: page.input().to_string(),
            source,
            skip_title_block,
            settings: page.settings().clone(),
            data,
        })
    }

    fn restore(self, index: usize) -> Result<Page> {
        let invalid = |what: &str| Error::Interchange(format!("page {}: {}", index, what));

        let mut page = match self.kind.as_str() {
            LOCATED => {
                if self.input.is_empty() || self.input == STDIN_SENTINEL {
                    return Err(invalid("located page needs a URL or path"));
                }
                Page::Located(LocatedPage::new(self.input))
            }
            STREAM => {
                let data = self
                    .data
                    .ok_or_else(|| invalid("stream page has no embedded data"))?;
                Page::Stream(StreamPage::new(STANDARD.decode(data)?))
            }
            DERIVED => {
                let source = self
                    .source
                    .filter(|s| !s.as_os_str().is_empty())
                    .ok_or_else(|| invalid("derived page has no source path"))?;
                Page::Derived(DerivedPage::new(source).skip_title_block(self.skip_title_block))
            }
            other => return Err(invalid(&format!("unknown page type {:?}", other))),
        };

        *page.settings_mut() = self.settings;
        Ok(page)
    }
}

/// Convert a document to JSON.
///
/// Fails if a stream or derived page cannot produce its content.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let record = DocumentRecord {
        global: doc.global.clone(),
        outline: doc.outline.clone(),
        cover: doc.cover.clone(),
        toc: doc.toc.clone(),
        pages: doc
            .pages()
            .iter()
            .map(PageRecord::capture)
            .collect::<Result<_>>()?,
    };

    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&record)?,
        JsonFormat::Compact => serde_json::to_string(&record)?,
    };
    Ok(json)
}

/// Rebuild a document from JSON produced by [`to_json`].
///
/// Pages are restored as saved; document defaults are not applied again.
pub fn from_json(json: &str) -> Result<Document> {
    restore(serde_json::from_str(json)?)
}

/// Rebuild a document from a reader of JSON.
pub fn from_reader<R: Read>(reader: R) -> Result<Document> {
    restore(serde_json::from_reader(reader)?)
}

fn restore(record: DocumentRecord) -> Result<Document> {
    let pages = record
        .pages
        .into_iter()
        .enumerate()
        .map(|(index, page)| page.restore(index))
        .collect::<Result<Vec<_>>>()?;

    let mut doc = Document::new();
    doc.global = record.global;
    doc.outline = record.outline;
    doc.cover = record.cover;
    doc.toc = record.toc;
    doc.set_pages(pages);
    Ok(doc)
}
