//! Flat generation requests.
//!
//! A [`GenerateRequest`] is the simple key/value form a front end receives:
//! one piece of Markdown or HTML content plus a handful of layout settings.

use crate::document::Document;
use crate::error::{ContentError, Error, Result};
use crate::markdown::{self, CommonMarkTransform};
use crate::page::{StreamPage, STDIN_SENTINEL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Kind of content carried by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// CommonMark, converted to HTML before rendering
    #[default]
    Markdown,
    /// HTML, rendered as is
    Html,
}

impl FromStr for InputType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(InputType::Markdown),
            "html" => Ok(InputType::Html),
            other => Err(Error::InvalidRequest(format!(
                "unknown input type '{}', use 'markdown' or 'html'",
                other
            ))),
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputType::Markdown => write!(f, "markdown"),
            InputType::Html => write!(f, "html"),
        }
    }
}

/// A single-page generation request.
///
/// # Example
///
/// ```
/// use wkpdf::GenerateRequest;
///
/// let request: GenerateRequest = serde_json::from_str(r#"{
///     "input": "<h1>Hello</h1>",
///     "inputType": "html",
///     "pageSize": "A4",
///     "marginTop": "20mm",
///     "replace": ["author=Jane"]
/// }"#).unwrap();
///
/// let doc = request.into_document().unwrap();
/// assert!(doc.arg_string().starts_with("--page-size A4 --margin-top 20mm page -"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    /// Markdown or HTML content
    pub input: String,
    /// How to interpret `input`
    pub input_type: InputType,
    /// Style sheet applied to the page
    pub theme: Option<String>,
    /// Header HTML file
    pub header: Option<String>,
    /// Footer HTML file
    pub footer: Option<String>,
    /// Cover HTML file; skipped with a warning when missing
    pub cover: Option<String>,
    /// Drop the leading `# Title` / `## Subtitle` block of Markdown input
    #[serde(rename = "skipH1H2")]
    pub skip_h1_h2: bool,
    /// Top margin with unit (`"25mm"`)
    pub margin_top: Option<String>,
    /// Bottom margin with unit
    pub margin_bottom: Option<String>,
    /// Left margin with unit
    pub margin_left: Option<String>,
    /// Right margin with unit
    pub margin_right: Option<String>,
    /// Paper size name (`"Letter"`, `"A4"`)
    pub page_size: Option<String>,
    /// `"Portrait"` or `"Landscape"`
    pub orientation: Option<String>,
    /// PDF title
    pub title: Option<String>,
    /// Header/footer replacements as `key=value`
    pub replace: Vec<String>,
}

impl GenerateRequest {
    /// Create a request for `input` of the given type.
    pub fn new(input: impl Into<String>, input_type: InputType) -> Self {
        Self {
            input: input.into(),
            input_type,
            ..Self::default()
        }
    }

    /// Validate the request and build the document it describes.
    pub fn into_document(self) -> Result<Document> {
        if self.input.trim().is_empty() {
            return Err(Error::InvalidRequest("input is required".into()));
        }
        let replacements = self
            .replace
            .iter()
            .map(String::as_str)
            .map(parse_replacement)
            .collect::<Result<Vec<_>>>()?;

        let mut doc = Document::new();
        set_if_present(&mut doc.global.title, self.title);
        set_if_present(&mut doc.global.page_size, self.page_size);
        set_if_present(&mut doc.global.orientation, self.orientation);
        set_if_present(&mut doc.global.margin_top_unit, self.margin_top);
        set_if_present(&mut doc.global.margin_bottom_unit, self.margin_bottom);
        set_if_present(&mut doc.global.margin_left_unit, self.margin_left);
        set_if_present(&mut doc.global.margin_right_unit, self.margin_right);

        if let Some(theme) = non_empty(self.theme) {
            doc.set_user_style_sheet(theme);
        }
        if let Some(footer) = non_empty(self.footer) {
            doc.set_footer_html(footer);
        }
        if let Some(header) = non_empty(self.header) {
            doc.set_header_html(header);
        }
        if let Some(cover) = non_empty(self.cover) {
            if Path::new(&cover).exists() {
                doc.set_cover(cover);
            } else {
                log::warn!("cover file not found at {}, skipping cover", cover);
            }
        }
        for (key, value) in replacements {
            doc.set_replace(key, value);
        }

        let html = match self.input_type {
            InputType::Markdown => markdown::render_document(
                self.input.as_bytes(),
                self.skip_h1_h2,
                &CommonMarkTransform::new(),
            )
            .map_err(|e| ContentError::new(STDIN_SENTINEL, e.to_string()))?,
            InputType::Html => self.input.into_bytes(),
        };
        doc.add_page(StreamPage::new(html));
        Ok(doc)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn set_if_present(option: &mut crate::options::StringOption, value: Option<String>) {
    if let Some(value) = non_empty(value) {
        option.set(value);
    }
}

/// Split a `key=value` replacement at the first `=`.
pub fn parse_replacement(entry: &str) -> Result<(String, String)> {
    match entry.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(Error::InvalidRequest(format!(
            "invalid replacement '{}', use key=value",
            entry
        ))),
    }
}
