//! Input pages.
//!
//! A page is one input HTML document; it can span several pages in the
//! output. Three kinds exist:
//!
//! - [`LocatedPage`]: a URL or file path handed to the executable as is
//! - [`StreamPage`]: HTML held in memory and piped through stdin
//! - [`DerivedPage`]: a Markdown file converted to HTML on first use and
//!   piped through stdin
//!
//! All three implement [`PageSource`], and [`Page`] wraps them in one type.

use crate::error::{ContentError, Result};
use crate::markdown::{self, CommonMarkTransform, MarkupTransform};
use crate::options::PageSettings;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Locator used for content delivered through stdin, and for stdout output.
pub const STDIN_SENTINEL: &str = "-";

/// Capabilities the argument builder needs from a page.
pub trait PageSource {
    /// Input locator: URL, path, or [`STDIN_SENTINEL`].
    fn input(&self) -> &str;

    /// The page's own options.
    fn settings(&self) -> &PageSettings;

    /// Mutable access to the page's own options.
    fn settings_mut(&mut self) -> &mut PageSettings;

    /// Content piped through stdin, if this page supplies any.
    fn content(&self) -> Option<Result<&[u8]>>;

    /// Argument fragment of the page's own options.
    fn args(&self) -> Vec<String> {
        self.settings().args()
    }
}

/// A page read by the executable from a URL or file path.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedPage {
    input: String,
    /// Page options
    pub settings: PageSettings,
}

impl LocatedPage {
    /// Create a page from a URL or path.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            settings: PageSettings::new(),
        }
    }
}

impl PageSource for LocatedPage {
    fn input(&self) -> &str {
        &self.input
    }

    fn settings(&self) -> &PageSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut PageSettings {
        &mut self.settings
    }

    fn content(&self) -> Option<Result<&[u8]>> {
        None
    }
}

/// A page whose HTML is held in memory.
#[derive(Clone, PartialEq)]
pub struct StreamPage {
    data: Vec<u8>,
    /// Page options
    pub settings: PageSettings,
}

impl StreamPage {
    /// Create a page from HTML bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            settings: PageSettings::new(),
        }
    }

    /// Create a page by draining a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::new(data))
    }

    /// The HTML bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for StreamPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamPage")
            .field("len", &self.data.len())
            .field("settings", &self.settings)
            .finish()
    }
}

impl PageSource for StreamPage {
    fn input(&self) -> &str {
        STDIN_SENTINEL
    }

    fn settings(&self) -> &PageSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut PageSettings {
        &mut self.settings
    }

    fn content(&self) -> Option<Result<&[u8]>> {
        Some(Ok(&self.data))
    }
}

/// A page converted from a Markdown file.
///
/// The file is read and converted on the first call to
/// [`content`](PageSource::content). The outcome, success or failure, is kept
/// and returned on every later call without touching the file again.
#[derive(Clone)]
pub struct DerivedPage {
    source: PathBuf,
    skip_title_block: bool,
    transform: Arc<dyn MarkupTransform>,
    cache: OnceLock<std::result::Result<Vec<u8>, ContentError>>,
    /// Page options
    pub settings: PageSettings,
}

impl DerivedPage {
    /// Create a page from a Markdown file, converted with [`CommonMarkTransform`].
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self::with_transform(source, Arc::new(CommonMarkTransform::new()))
    }

    /// Create a page converted with a custom transform.
    pub fn with_transform(source: impl Into<PathBuf>, transform: Arc<dyn MarkupTransform>) -> Self {
        Self {
            source: source.into(),
            skip_title_block: false,
            transform,
            cache: OnceLock::new(),
            settings: PageSettings::new(),
        }
    }

    /// Drop the leading `# Title` / `## Subtitle` block before converting.
    ///
    /// Useful when those headings already appear on a cover page. Has no
    /// effect once the content has been produced.
    pub fn skip_title_block(mut self, skip: bool) -> Self {
        self.skip_title_block = skip;
        self
    }

    /// Set the title-block flag in place.
    pub fn set_skip_title_block(&mut self, skip: bool) {
        self.skip_title_block = skip;
    }

    /// Whether the title block is skipped.
    pub fn skips_title_block(&self) -> bool {
        self.skip_title_block
    }

    /// Path of the Markdown source.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Whether the content has been produced (or failed) already.
    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    fn load(&self) -> std::result::Result<Vec<u8>, ContentError> {
        log::debug!("converting markdown page {}", self.source.display());
        let raw = std::fs::read(&self.source)
            .map_err(|e| ContentError::new(&self.source, e.to_string()))?;
        markdown::render_document(&raw, self.skip_title_block, self.transform.as_ref())
            .map_err(|e| ContentError::new(&self.source, e.to_string()))
    }
}

impl fmt::Debug for DerivedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedPage")
            .field("source", &self.source)
            .field("skip_title_block", &self.skip_title_block)
            .field("transform", &self.transform)
            .field("loaded", &self.is_loaded())
            .field("settings", &self.settings)
            .finish()
    }
}

impl PageSource for DerivedPage {
    fn input(&self) -> &str {
        STDIN_SENTINEL
    }

    fn settings(&self) -> &PageSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut PageSettings {
        &mut self.settings
    }

    fn content(&self) -> Option<Result<&[u8]>> {
        let cached = self.cache.get_or_init(|| self.load());
        Some(match cached {
            Ok(html) => Ok(html.as_slice()),
            Err(e) => Err(e.clone().into()),
        })
    }
}

/// Any input page.
#[derive(Debug, Clone)]
pub enum Page {
    /// URL or file path
    Located(LocatedPage),
    /// In-memory HTML
    Stream(StreamPage),
    /// Converted Markdown file
    Derived(DerivedPage),
}

impl Page {
    /// Page from a URL or path.
    pub fn located(input: impl Into<String>) -> Self {
        Page::Located(LocatedPage::new(input))
    }

    /// Page from in-memory HTML.
    pub fn stream(data: impl Into<Vec<u8>>) -> Self {
        Page::Stream(StreamPage::new(data))
    }

    /// Page from a Markdown file.
    pub fn derived(source: impl Into<PathBuf>) -> Self {
        Page::Derived(DerivedPage::new(source))
    }

    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Page::Located(_) => "located",
            Page::Stream(_) => "stream",
            Page::Derived(_) => "derived",
        }
    }

    fn source(&self) -> &dyn PageSource {
        match self {
            Page::Located(p) => p,
            Page::Stream(p) => p,
            Page::Derived(p) => p,
        }
    }

    fn source_mut(&mut self) -> &mut dyn PageSource {
        match self {
            Page::Located(p) => p,
            Page::Stream(p) => p,
            Page::Derived(p) => p,
        }
    }
}

impl PageSource for Page {
    fn input(&self) -> &str {
        self.source().input()
    }

    fn settings(&self) -> &PageSettings {
        self.source().settings()
    }

    fn settings_mut(&mut self) -> &mut PageSettings {
        self.source_mut().settings_mut()
    }

    fn content(&self) -> Option<Result<&[u8]>> {
        self.source().content()
    }
}

impl From<LocatedPage> for Page {
    fn from(page: LocatedPage) -> Self {
        Page::Located(page)
    }
}

impl From<StreamPage> for Page {
    fn from(page: StreamPage) -> Self {
        Page::Stream(page)
    }
}

impl From<DerivedPage> for Page {
    fn from(page: DerivedPage) -> Self {
        Page::Derived(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    struct CountingTransform {
        calls: AtomicUsize,
    }

    impl MarkupTransform for CountingTransform {
        fn transform(&self, source: &[u8]) -> std::result::Result<Vec<u8>, markdown::TransformError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(source.to_ascii_uppercase())
        }
    }

    #[test]
    fn test_located_page() {
        let page = LocatedPage::new("https://example.com");
        assert_eq!(page.input(), "https://example.com");
        assert!(page.content().is_none());
        assert!(page.args().is_empty());
    }

    #[test]
    fn test_stream_page() {
        let page = StreamPage::from_reader(&b"<p>hi</p>"[..]).unwrap();
        assert_eq!(page.input(), STDIN_SENTINEL);
        assert_eq!(page.content().unwrap().unwrap(), b"<p>hi</p>");
        // repeatable
        assert_eq!(page.content().unwrap().unwrap(), b"<p>hi</p>");
    }

    #[test]
    fn test_page_args_come_from_settings() {
        let mut page = Page::located("index.html");
        page.settings_mut().options.zoom.set(0.75);
        page.settings_mut().header_footer.footer_line.set(true);
        assert_eq!(page.args(), vec!["--zoom", "0.750", "--footer-line"]);
    }

    #[test]
    fn test_derived_page_is_cached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "hello").unwrap();

        let transform = Arc::new(CountingTransform::default());
        let page = DerivedPage::with_transform(&path, transform.clone());
        assert!(!page.is_loaded());

        let first = page.content().unwrap().unwrap().to_vec();
        std::fs::write(&path, "changed").unwrap();
        let second = page.content().unwrap().unwrap().to_vec();

        assert_eq!(first, second);
        assert!(String::from_utf8(first).unwrap().contains("HELLO"));
        assert_eq!(transform.calls.load(Ordering::SeqCst), 1);
        assert!(page.is_loaded());
    }

    #[test]
    fn test_derived_page_failure_is_replayed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.md");
        let page = DerivedPage::new(&path);

        let first = match page.content() {
            Some(Err(Error::ContentRead(e))) => e,
            other => panic!("expected content error, got {:?}", other.map(|r| r.is_ok())),
        };

        // creating the file afterwards must not change the outcome
        std::fs::write(&path, "# now it exists").unwrap();
        let second = match page.content() {
            Some(Err(Error::ContentRead(e))) => e,
            other => panic!("expected content error, got {:?}", other.map(|r| r.is_ok())),
        };

        assert_eq!(first, second);
        assert_eq!(first.path, path);
    }

    #[test]
    fn test_derived_page_skips_title_block() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# Title\n\n## Subtitle\nBody text\n").unwrap();

        let page = DerivedPage::new(&path).skip_title_block(true);
        let html = String::from_utf8(page.content().unwrap().unwrap().to_vec()).unwrap();
        assert!(html.contains("<p>Body text</p>"));
        assert!(!html.contains("<h1"));
        assert!(!html.contains("<h2"));
        assert!(!html.contains("Subtitle"));
    }

    #[test]
    fn test_page_kind() {
        assert_eq!(Page::located("a").kind(), "located");
        assert_eq!(Page::stream("b").kind(), "stream");
        assert_eq!(Page::derived("c.md").kind(), "derived");
        assert_eq!(Page::derived("c.md").input(), STDIN_SENTINEL);
    }
}
