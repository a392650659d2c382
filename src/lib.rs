//! # wkpdf
//!
//! Typed configuration and process driver for the `wkhtmltopdf` executable.
//!
//! A [`Document`] collects option groups, a cover, a table of contents and a
//! list of pages, flattens them into the executable's argument vector and
//! runs it, collecting the PDF in memory or in a file.
//!
//! ## Quick Start
//!
//! ```no_run
//! use wkpdf::{Document, Page, PageSize};
//!
//! fn main() -> wkpdf::Result<()> {
//!     let mut doc = Document::try_new()?;
//!     doc.global.page_size.set(PageSize::A4);
//!     doc.set_footer_html("footer.html");
//!     doc.add_page(Page::located("https://example.com"));
//!     doc.add_page(Page::derived("notes.md"));
//!
//!     doc.create()?;
//!     doc.write_file("out.pdf")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Full option catalogue**: global, outline, page, header/footer and toc flags
//! - **Three page sources**: URLs/paths, in-memory HTML, converted Markdown
//! - **Document defaults**: style sheet, header, footer and replacements merged into new pages
//! - **Cancellation**: explicit or deadline-based, via [`CancelToken`]
//! - **JSON interchange**: save a document with its inline content and run it later

pub mod cancel;
pub mod document;
pub mod error;
pub mod executable;
pub mod interchange;
pub mod markdown;
pub mod options;
pub mod page;
pub mod process;
pub mod request;

// Re-export commonly used types
pub use cancel::{CancelReason, CancelToken};
pub use document::{Cover, Document, OutputTarget, Toc};
pub use error::{ContentError, Error, Result};
pub use interchange::{from_json, from_reader, to_json, JsonFormat};
pub use markdown::{CommonMarkTransform, MarkupTransform};
pub use options::{
    GlobalOptions, HeaderFooterOptions, Orientation, OutlineOptions, PageOptions, PageSettings,
    PageSize, TocOptions,
};
pub use page::{DerivedPage, LocatedPage, Page, PageSource, StreamPage, STDIN_SENTINEL};
pub use process::{CommandRunner, Invocation, SystemRunner};
pub use request::{GenerateRequest, InputType};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load a document saved with [`to_json`].
///
/// # Example
///
/// ```no_run
/// use wkpdf::load_json_file;
///
/// let mut doc = load_json_file("job.json").unwrap();
/// doc.create().unwrap();
/// ```
pub fn load_json_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let file = File::open(path)?;
    from_reader(BufReader::new(file))
}

/// Save a document as pretty-printed JSON.
pub fn save_json_file<P: AsRef<Path>>(doc: &Document, path: P) -> Result<()> {
    let json = to_json(doc, JsonFormat::Pretty)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Build a document from `request`, render it and return the PDF bytes.
///
/// # Example
///
/// ```no_run
/// use wkpdf::{generate, GenerateRequest, InputType};
///
/// let request = GenerateRequest::new("# Report\n\nAll good.", InputType::Markdown);
/// let pdf = generate(request).unwrap();
/// std::fs::write("report.pdf", pdf).unwrap();
/// ```
pub fn generate(request: GenerateRequest) -> Result<Vec<u8>> {
    let mut doc = request.into_document()?;
    doc.create()?;
    Ok(std::mem::take(doc.buffer()))
}
