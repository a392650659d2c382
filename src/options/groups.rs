//! Option groups mirroring the rendering executable's flag namespaces.

use super::{option_group, BoolOption, FloatOption, ListOption, MapOption, StringOption, UintOption};
use serde::{Deserialize, Serialize};
use std::fmt;

option_group! {
    /// Document-wide settings, emitted once at the start of the argument vector.
    ///
    /// The `*_unit` variants share a flag with their numeric counterpart and
    /// accept a value with a unit (`"25mm"`, `"1in"`). Setting both produces a
    /// duplicate flag, which [`Document::create`](crate::Document::create)
    /// rejects.
    pub struct GlobalOptions {
        /// Paper size: A4, Letter, ... (default A4)
        page_size: StringOption = "page-size",
        /// Landscape or Portrait (default Portrait)
        orientation: StringOption = "orientation",
        /// Page width in millimetres
        page_width: UintOption = "page-width",
        /// Page width with unit
        page_width_unit: StringOption = "page-width",
        /// Page height in millimetres
        page_height: UintOption = "page-height",
        /// Page height with unit
        page_height_unit: StringOption = "page-height",
        /// Top margin in millimetres
        margin_top: UintOption = "margin-top",
        /// Top margin with unit
        margin_top_unit: StringOption = "margin-top",
        /// Bottom margin in millimetres
        margin_bottom: UintOption = "margin-bottom",
        /// Bottom margin with unit
        margin_bottom_unit: StringOption = "margin-bottom",
        /// Left margin in millimetres (default 10mm)
        margin_left: UintOption = "margin-left",
        /// Left margin with unit
        margin_left_unit: StringOption = "margin-left",
        /// Right margin in millimetres (default 10mm)
        margin_right: UintOption = "margin-right",
        /// Right margin with unit
        margin_right_unit: StringOption = "margin-right",
        /// Title of the generated PDF
        title: StringOption = "title",
        /// Explicit dpi
        dpi: UintOption = "dpi",
        /// Downscale embedded images to this dpi (default 600)
        image_dpi: UintOption = "image-dpi",
        /// JPEG quality for embedded images (default 94)
        image_quality: UintOption = "image-quality",
        /// Number of copies (default 1)
        copies: UintOption = "copies",
        /// Do not collate multiple copies
        no_collate: BoolOption = "no-collate",
        /// Grayscale output
        grayscale: BoolOption = "grayscale",
        /// Lower quality, smaller output
        low_quality: BoolOption = "lowquality",
        /// Disable lossless compression of PDF objects
        no_pdf_compression: BoolOption = "no-pdf-compression",
        /// Cookie jar file to read and write
        cookie_jar: StringOption = "cookie-jar",
        /// Less verbose output
        quiet: BoolOption = "quiet",
        /// none, error, warn or info
        log_level: StringOption = "log-level",
        /// Read further command lines from stdin
        read_args_from_stdin: BoolOption = "read-args-from-stdin",
        extended_help: BoolOption = "extended-help",
        help: BoolOption = "help",
        htmldoc: BoolOption = "htmldoc",
        license: BoolOption = "license",
        manpage: BoolOption = "manpage",
        readme: BoolOption = "readme",
        version: BoolOption = "version",
    }
}

option_group! {
    /// PDF outline (bookmark) settings.
    pub struct OutlineOptions {
        /// Dump the default TOC XSL style sheet to stdout
        dump_default_toc_xsl: BoolOption = "dump-default-toc-xsl",
        /// Dump the outline to a file
        dump_outline: StringOption = "dump-outline",
        /// Put an outline into the PDF
        outline: BoolOption = "outline",
        /// Do not put an outline into the PDF
        no_outline: BoolOption = "no-outline",
        /// Outline depth (default 4)
        outline_depth: UintOption = "outline-depth",
    }
}

option_group! {
    /// Loading and rendering settings of one input (page, cover or TOC).
    pub struct PageOptions {
        /// Allow files from this folder to be loaded (repeatable)
        allow: ListOption = "allow",
        background: BoolOption = "background",
        no_background: BoolOption = "no-background",
        /// Bypass the proxy for this host (repeatable)
        bypass_proxy_for: ListOption = "bypass-proxy-for",
        cache_dir: StringOption = "cache-dir",
        checkbox_checked_svg: StringOption = "checkbox-checked-svg",
        checkbox_svg: StringOption = "checkbox-svg",
        /// Additional cookies, values url encoded (repeatable)
        cookie: MapOption = "cookie",
        /// Additional HTTP headers (repeatable)
        custom_header: MapOption = "custom-header",
        custom_header_propagation: BoolOption = "custom-header-propagation",
        no_custom_header_propagation: BoolOption = "no-custom-header-propagation",
        debug_javascript: BoolOption = "debug-javascript",
        no_debug_javascript: BoolOption = "no-debug-javascript",
        /// Page name on the left, page number on the right
        default_header: BoolOption = "default-header",
        /// Default text encoding of the input
        encoding: StringOption = "encoding",
        disable_external_links: BoolOption = "disable-external-links",
        enable_external_links: BoolOption = "enable-external-links",
        disable_forms: BoolOption = "disable-forms",
        enable_forms: BoolOption = "enable-forms",
        images: BoolOption = "images",
        no_images: BoolOption = "no-images",
        disable_internal_links: BoolOption = "disable-internal-links",
        enable_internal_links: BoolOption = "enable-internal-links",
        disable_javascript: BoolOption = "disable-javascript",
        enable_javascript: BoolOption = "enable-javascript",
        /// Milliseconds to wait for javascript (default 200)
        javascript_delay: UintOption = "javascript-delay",
        keep_relative_links: BoolOption = "keep-relative-links",
        /// abort, ignore or skip (default abort)
        load_error_handling: StringOption = "load-error-handling",
        /// abort, ignore or skip (default ignore)
        load_media_error_handling: StringOption = "load-media-error-handling",
        disable_local_file_access: BoolOption = "disable-local-file-access",
        enable_local_file_access: BoolOption = "enable-local-file-access",
        minimum_font_size: UintOption = "minimum-font-size",
        exclude_from_outline: BoolOption = "exclude-from-outline",
        include_in_outline: BoolOption = "include-in-outline",
        /// Starting page number (default 0)
        page_offset: UintOption = "page-offset",
        /// HTTP authentication password
        password: StringOption = "password",
        disable_plugins: BoolOption = "disable-plugins",
        enable_plugins: BoolOption = "enable-plugins",
        /// Additional post fields (repeatable)
        post: MapOption = "post",
        /// Additional post files (repeatable)
        post_file: MapOption = "post-file",
        print_media_type: BoolOption = "print-media-type",
        no_print_media_type: BoolOption = "no-print-media-type",
        proxy: StringOption = "proxy",
        proxy_hostname_lookup: BoolOption = "proxy-hostname-lookup",
        radiobutton_checked_svg: StringOption = "radiobutton-checked-svg",
        radiobutton_svg: StringOption = "radiobutton-svg",
        resolve_relative_links: BoolOption = "resolve-relative-links",
        /// Extra javascript run after loading (repeatable)
        run_script: ListOption = "run-script",
        disable_smart_shrinking: BoolOption = "disable-smart-shrinking",
        enable_smart_shrinking: BoolOption = "enable-smart-shrinking",
        ssl_crt_path: StringOption = "ssl-crt-path",
        ssl_key_password: StringOption = "ssl-key-password",
        ssl_key_path: StringOption = "ssl-key-path",
        stop_slow_scripts: BoolOption = "stop-slow-scripts",
        no_stop_slow_scripts: BoolOption = "no-stop-slow-scripts",
        disable_toc_back_links: BoolOption = "disable-toc-back-links",
        enable_toc_back_links: BoolOption = "enable-toc-back-links",
        /// CSS file loaded with the page
        user_style_sheet: StringOption = "user-style-sheet",
        /// HTTP authentication username
        username: StringOption = "username",
        /// Emulated window size, e.g. `1280x1024`
        viewport_size: StringOption = "viewport-size",
        /// Wait until window.status equals this value
        window_status: StringOption = "window-status",
        /// Zoom factor (default 1)
        zoom: FloatOption = "zoom",
    }
}

option_group! {
    /// Header and footer settings of one input.
    pub struct HeaderFooterOptions {
        footer_center: StringOption = "footer-center",
        footer_font_name: StringOption = "footer-font-name",
        footer_font_size: UintOption = "footer-font-size",
        /// HTML file used as footer
        footer_html: StringOption = "footer-html",
        footer_left: StringOption = "footer-left",
        footer_line: BoolOption = "footer-line",
        no_footer_line: BoolOption = "no-footer-line",
        footer_right: StringOption = "footer-right",
        /// Spacing between footer and content in mm
        footer_spacing: FloatOption = "footer-spacing",
        header_center: StringOption = "header-center",
        header_font_name: StringOption = "header-font-name",
        header_font_size: UintOption = "header-font-size",
        /// HTML file used as header
        header_html: StringOption = "header-html",
        header_left: StringOption = "header-left",
        header_line: BoolOption = "header-line",
        no_header_line: BoolOption = "no-header-line",
        header_right: StringOption = "header-right",
        /// Spacing between header and content in mm
        header_spacing: FloatOption = "header-spacing",
        /// Replace `[name]` with a value in header and footer (repeatable)
        replace: MapOption = "replace",
    }
}

option_group! {
    /// Table-of-contents specific settings.
    pub struct TocOptions {
        disable_dotted_lines: BoolOption = "disable-dotted-lines",
        toc_header_text: StringOption = "toc-header-text",
        toc_level_indentation: UintOption = "toc-level-indentation",
        disable_toc_links: BoolOption = "disable-toc-links",
        toc_text_size_shrink: FloatOption = "toc-text-size-shrink",
        xsl_style_sheet: StringOption = "xsl-style-sheet",
    }
}

/// Everything a page carries: its own options plus header/footer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSettings {
    /// Loading and rendering options
    pub options: PageOptions,
    /// Header and footer options
    pub header_footer: HeaderFooterOptions,
}

impl PageSettings {
    /// Create settings with every option unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Page options followed by header/footer options.
    pub fn args(&self) -> Vec<String> {
        let mut args = self.options.args();
        args.extend(self.header_footer.args());
        args
    }
}

/// Paper sizes understood by the rendering executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageSize {
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
    A8,
    A9,
    B0,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    B8,
    B9,
    B10,
    C5E,
    Comm10E,
    DLE,
    Executive,
    Folio,
    Ledger,
    Legal,
    Letter,
    Tabloid,
    Custom,
}

impl PageSize {
    /// Name as passed to `--page-size`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::A0 => "A0",
            PageSize::A1 => "A1",
            PageSize::A2 => "A2",
            PageSize::A3 => "A3",
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
            PageSize::A6 => "A6",
            PageSize::A7 => "A7",
            PageSize::A8 => "A8",
            PageSize::A9 => "A9",
            PageSize::B0 => "B0",
            PageSize::B1 => "B1",
            PageSize::B2 => "B2",
            PageSize::B3 => "B3",
            PageSize::B4 => "B4",
            PageSize::B5 => "B5",
            PageSize::B6 => "B6",
            PageSize::B7 => "B7",
            PageSize::B8 => "B8",
            PageSize::B9 => "B9",
            PageSize::B10 => "B10",
            PageSize::C5E => "C5E",
            PageSize::Comm10E => "Comm10E",
            PageSize::DLE => "DLE",
            PageSize::Executive => "Executive",
            PageSize::Folio => "Folio",
            PageSize::Ledger => "Ledger",
            PageSize::Legal => "Legal",
            PageSize::Letter => "Letter",
            PageSize::Tabloid => "Tabloid",
            PageSize::Custom => "Custom",
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PageSize> for String {
    fn from(size: PageSize) -> Self {
        size.as_str().to_string()
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Name as passed to `--orientation`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Orientation> for String {
    fn from(orientation: Orientation) -> Self {
        orientation.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_groups_produce_no_args() {
        assert!(GlobalOptions::new().args().is_empty());
        assert!(OutlineOptions::new().args().is_empty());
        assert!(PageOptions::new().args().is_empty());
        assert!(HeaderFooterOptions::new().args().is_empty());
        assert!(TocOptions::new().args().is_empty());
        assert!(PageSettings::new().args().is_empty());
    }

    #[test]
    fn test_global_args_follow_declaration_order() {
        let mut global = GlobalOptions::new();
        global.dpi.set(600);
        global.no_collate.set(false);
        global.page_size.set(PageSize::A4);
        global.margin_bottom.set(40);
        global.margin_left.set(0);

        assert_eq!(
            global.args(),
            vec![
                "--page-size",
                "A4",
                "--margin-bottom",
                "40",
                "--margin-left",
                "0",
                "--dpi",
                "600"
            ]
        );
    }

    #[test]
    fn test_unit_options_share_flag_names() {
        let global = GlobalOptions::new();
        assert_eq!(global.margin_top.flag(), global.margin_top_unit.flag());
        assert_eq!(global.page_width.flag(), global.page_width_unit.flag());
    }

    #[test]
    fn test_unit_options() {
        let mut global = GlobalOptions::new();
        global.margin_right_unit.set("1mm");
        global.margin_left_unit.set("2cm");
        global.margin_bottom_unit.set("0.5cm");
        global.margin_top_unit.set("10mm");
        global.page_height_unit.set("10in");
        global.page_width_unit.set("5.5in");

        assert_eq!(
            global.args().join(" "),
            "--page-width 5.5in --page-height 10in --margin-top 10mm --margin-bottom 0.5cm \
             --margin-left 2cm --margin-right 1mm"
        );
    }

    #[test]
    fn test_page_settings_put_header_footer_last() {
        let mut settings = PageSettings::new();
        settings.header_footer.header_spacing.set(10.01);
        settings.options.allow.set("/usr/local/html");
        settings.options.allow.set("/usr/local/images");
        settings.options.custom_header.set("X-AppKey", "abcdef");
        settings.options.disable_smart_shrinking.set(true);
        settings.options.enable_local_file_access.set(true);
        settings.options.viewport_size.set("3840x2160");

        assert_eq!(
            settings.args().join(" "),
            "--allow /usr/local/html --allow /usr/local/images --custom-header X-AppKey abcdef \
             --disable-smart-shrinking --enable-local-file-access --viewport-size 3840x2160 \
             --header-spacing 10.010"
        );
    }

    #[test]
    fn test_toc_options() {
        let mut toc = TocOptions::new();
        toc.disable_dotted_lines.set(true);
        toc.toc_header_text.set("Contents");
        toc.toc_text_size_shrink.set(0.8);
        assert_eq!(
            toc.args(),
            vec![
                "--disable-dotted-lines",
                "--toc-header-text",
                "Contents",
                "--toc-text-size-shrink",
                "0.800"
            ]
        );
    }

    #[test]
    fn test_page_size_names() {
        assert_eq!(PageSize::Letter.as_str(), "Letter");
        assert_eq!(PageSize::Comm10E.to_string(), "Comm10E");
        assert_eq!(String::from(PageSize::A4), "A4");
        assert_eq!(Orientation::Landscape.to_string(), "Landscape");
        assert_eq!(Orientation::default(), Orientation::Portrait);
    }

    #[test]
    fn test_group_round_trips_through_json() {
        let mut outline = OutlineOptions::new();
        outline.outline_depth.set(3);
        outline.no_outline.set(true);

        let json = serde_json::to_string(&outline).unwrap();
        let back: OutlineOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outline);
        assert_eq!(back.args(), outline.args());
    }
}
