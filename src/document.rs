//! The document aggregate and argument assembly.

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::executable;
use crate::options::{
    GlobalOptions, HeaderFooterOptions, MapOption, OutlineOptions, PageOptions, PageSettings,
    StringOption, TocOptions, FLAG_PREFIX,
};
use crate::page::{Page, PageSource, STDIN_SENTINEL};
use crate::process::{CommandRunner, Invocation, SystemRunner};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Cover page: an HTML file or URL shown before everything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cover {
    /// Locator of the cover; no cover is emitted while this is `None`
    pub input: Option<String>,
    /// Layout options for the cover page
    pub options: PageOptions,
}

/// Table of contents settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Toc {
    /// Whether a table of contents is generated
    pub include: bool,
    /// Layout options for the toc pages
    pub options: PageOptions,
    /// Toc-specific options
    pub toc: TocOptions,
    /// Header and footer of the toc pages
    pub header_footer: HeaderFooterOptions,
}

/// Where the rendered PDF goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
    /// Written to stdout and collected in the document's buffer
    #[default]
    Buffer,
    /// Written by the executable to this file
    File(PathBuf),
}

/// Settings merged into each page as it is added.
#[derive(Debug, Clone)]
struct Defaults {
    user_style_sheet: Option<String>,
    header_html: Option<String>,
    footer_html: Option<String>,
    replace: MapOption,
}

impl Defaults {
    fn new() -> Self {
        Self {
            user_style_sheet: None,
            header_html: None,
            footer_html: None,
            replace: MapOption::new("replace"),
        }
    }

    fn apply(&self, settings: &mut PageSettings) {
        fill_if_blank(&mut settings.options.user_style_sheet, &self.user_style_sheet);
        fill_if_blank(&mut settings.header_footer.header_html, &self.header_html);
        fill_if_blank(&mut settings.header_footer.footer_html, &self.footer_html);
        for (key, value) in self.replace.entries() {
            settings.header_footer.replace.set_if_absent(key, value);
        }
    }
}

fn fill_if_blank(option: &mut StringOption, default: &Option<String>) {
    let Some(default) = default.as_deref().filter(|d| !d.is_empty()) else {
        return;
    };
    if option.value().map_or(true, String::is_empty) {
        option.set(default);
    }
}

/// A PDF to be generated from one or more input pages.
///
/// Options are set directly on the public groups; pages are added with
/// [`add_page`](Self::add_page). [`args`](Self::args) shows the exact
/// argument vector the executable will receive.
///
/// # Example
///
/// ```
/// use wkpdf::{Document, Page, PageSize};
///
/// let mut doc = Document::new();
/// doc.global.page_size.set(PageSize::Letter);
/// doc.global.margin_top_unit.set("25mm");
/// doc.add_page(Page::located("https://example.com"));
///
/// let args = doc.args();
/// assert_eq!(&args[..5], ["--page-size", "Letter", "--margin-top", "25mm", "page"]);
/// assert_eq!(args.last().map(String::as_str), Some("-"));
/// ```
pub struct Document {
    /// Document-wide options
    pub global: GlobalOptions,
    /// Outline options
    pub outline: OutlineOptions,
    /// Cover page
    pub cover: Cover,
    /// Table of contents
    pub toc: Toc,

    pages: Vec<Page>,
    output: OutputTarget,
    defaults: Defaults,

    buffer: Vec<u8>,
    stdout_sink: Option<Box<dyn Write + Send>>,
    stderr_sink: Option<Box<dyn Write + Send>>,

    executable: Option<PathBuf>,
    runner: Arc<dyn CommandRunner>,
}

impl Document {
    /// Create an empty document.
    ///
    /// The executable is located when the document is first rendered.
    pub fn new() -> Self {
        Self {
            global: GlobalOptions::new(),
            outline: OutlineOptions::new(),
            cover: Cover::default(),
            toc: Toc::default(),
            pages: Vec::new(),
            output: OutputTarget::Buffer,
            defaults: Defaults::new(),
            buffer: Vec::new(),
            stdout_sink: None,
            stderr_sink: None,
            executable: None,
            runner: Arc::new(SystemRunner::new()),
        }
    }

    /// Create an empty document, failing early if the executable cannot be found.
    pub fn try_new() -> Result<Self> {
        let path = executable::resolve()?;
        Ok(Self::new().with_executable(path))
    }

    /// Use this executable instead of the process-wide one.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Run the executable through a custom runner.
    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Arc::new(runner);
        self
    }

    /// Write the PDF to a file instead of the internal buffer.
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.set_output_file(path);
        self
    }

    /// Write the PDF to a file instead of the internal buffer.
    pub fn set_output_file(&mut self, path: impl Into<PathBuf>) {
        self.output = OutputTarget::File(path.into());
    }

    /// Collect the PDF in the internal buffer (the default).
    pub fn set_output_buffer(&mut self) {
        self.output = OutputTarget::Buffer;
    }

    /// Current output target.
    pub fn output_target(&self) -> &OutputTarget {
        &self.output
    }

    /// Output file, if one is set.
    pub fn output_file(&self) -> Option<&Path> {
        match &self.output {
            OutputTarget::File(path) => Some(path),
            OutputTarget::Buffer => None,
        }
    }

    /// Add a page, filling in the document defaults the page does not set itself.
    ///
    /// Defaults are copied at this point; changing them later does not affect
    /// pages already added.
    pub fn add_page(&mut self, page: impl Into<Page>) {
        let mut page = page.into();
        self.defaults.apply(page.settings_mut());
        self.pages.push(page);
    }

    /// Replace all pages. Defaults are not applied.
    pub fn set_pages(&mut self, pages: Vec<Page>) {
        self.pages = pages;
    }

    /// Drop all pages, keeping every other setting.
    pub fn reset_pages(&mut self) {
        self.pages.clear();
    }

    /// Pages in output order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Mutable access to one page.
    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    /// Set the cover page. An empty path removes it.
    pub fn set_cover(&mut self, input: impl Into<String>) {
        let input = input.into();
        self.cover.input = if input.is_empty() { None } else { Some(input) };
    }

    /// Style sheet applied to pages added from now on.
    pub fn set_user_style_sheet(&mut self, path: impl Into<String>) {
        self.defaults.user_style_sheet = Some(path.into());
    }

    /// Header HTML applied to pages added from now on.
    pub fn set_header_html(&mut self, path: impl Into<String>) {
        self.defaults.header_html = Some(path.into());
    }

    /// Footer HTML applied to pages added from now on.
    pub fn set_footer_html(&mut self, path: impl Into<String>) {
        self.defaults.footer_html = Some(path.into());
    }

    /// Header/footer replacement applied to pages added from now on.
    ///
    /// A page that already defines `key` keeps its own value.
    pub fn set_replace(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.defaults.replace.set(key, value);
    }

    /// The complete argument vector.
    pub fn args(&self) -> Vec<String> {
        let mut args = self.global.args();
        args.extend(self.outline.args());

        if let Some(input) = self.cover.input.as_deref().filter(|i| !i.is_empty()) {
            args.push("cover".to_string());
            args.push(input.to_string());
            args.extend(self.cover.options.args());
        }

        if self.toc.include {
            args.push("toc".to_string());
            args.extend(self.toc.options.args());
            args.extend(self.toc.toc.args());
            args.extend(self.toc.header_footer.args());
        }

        for page in &self.pages {
            args.push("page".to_string());
            args.push(page.input().to_string());
            args.extend(page.args());
        }

        match &self.output {
            OutputTarget::File(path) => args.push(path.display().to_string()),
            OutputTarget::Buffer => args.push(STDIN_SENTINEL.to_string()),
        }
        args
    }

    /// The argument vector joined with spaces.
    pub fn arg_string(&self) -> String {
        self.args().join(" ")
    }

    /// Fail if a global flag would be passed twice.
    ///
    /// Only the global group is checked; pages may repeat flags freely. A
    /// value that itself starts with `--` is taken for a flag.
    pub fn check_duplicate_flags(&self) -> Result<()> {
        let mut seen: Vec<String> = Vec::new();
        for arg in self.global.args() {
            if arg.starts_with(FLAG_PREFIX) {
                if seen.contains(&arg) {
                    return Err(Error::DuplicateArgument(arg));
                }
                seen.push(arg);
            }
        }
        Ok(())
    }

    /// Send the PDF to `sink` instead of the internal buffer.
    pub fn set_output(&mut self, sink: impl Write + Send + 'static) {
        self.stdout_sink = Some(Box::new(sink));
    }

    /// Forward the executable's stderr to `sink`.
    ///
    /// Failures then no longer include the stderr text.
    pub fn set_stderr(&mut self, sink: impl Write + Send + 'static) {
        self.stderr_sink = Some(Box::new(sink));
    }

    /// Output collected by the last run.
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// The internal output buffer.
    pub fn buffer(&mut self) -> &mut Vec<u8> {
        &mut self.buffer
    }

    /// Write the internal buffer to `path`.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.buffer)?;
        Ok(())
    }

    /// Render the PDF.
    pub fn create(&mut self) -> Result<()> {
        self.create_with_cancel(&CancelToken::new())
    }

    /// Render the PDF, stopping the executable when `cancel` fires.
    ///
    /// On failure the buffer keeps whatever output was produced.
    pub fn create_with_cancel(&mut self, cancel: &CancelToken) -> Result<()> {
        self.check_duplicate_flags()?;

        let program = match &self.executable {
            Some(path) => path.clone(),
            None => executable::resolve()?,
        };
        let args = self.args();
        log::debug!("running {} with {} arguments", program.display(), args.len());
        for arg in &args {
            log::trace!("  {}", arg);
        }

        let stdin = stdin_content(&self.pages)?;

        let stdout: &mut (dyn Write + Send) = match self.stdout_sink.as_mut() {
            Some(sink) => &mut **sink,
            None => {
                self.buffer.clear();
                &mut self.buffer
            }
        };
        let stderr = self
            .stderr_sink
            .as_mut()
            .map(|sink| &mut **sink as &mut (dyn Write + Send));

        self.runner.run(Invocation {
            program: &program,
            args: &args,
            stdin,
            cancel,
            stdout,
            stderr,
        })
    }
}

/// Content of the first page that supplies some; later ones are ignored.
fn stdin_content(pages: &[Page]) -> Result<Option<&[u8]>> {
    let mut found: Option<(usize, &[u8])> = None;
    for (index, page) in pages.iter().enumerate() {
        if let Some((first, _)) = found {
            if page.input() == STDIN_SENTINEL {
                log::warn!(
                    "page {} also reads from stdin; only page {} is piped",
                    index,
                    first
                );
            }
            continue;
        }
        if let Some(content) = page.content() {
            let content = content?;
            log::debug!("piping {} bytes of page {} ({}) to stdin", content.len(), index, page.kind());
            found = Some((index, content));
        }
    }
    Ok(found.map(|(_, content)| content))
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("global", &self.global)
            .field("outline", &self.outline)
            .field("cover", &self.cover)
            .field("toc", &self.toc)
            .field("pages", &self.pages)
            .field("output", &self.output)
            .field("defaults", &self.defaults)
            .field("executable", &self.executable)
            .finish_non_exhaustive()
    }
}
