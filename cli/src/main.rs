//! wkpdf CLI - Markdown/HTML to PDF through wkhtmltopdf

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use wkpdf::{CancelToken, Document, GenerateRequest, InputType, JsonFormat};

#[derive(Parser)]
#[command(name = "wkpdf")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Render Markdown and HTML to PDF with wkhtmltopdf", long_about = None)]
struct Cli {
    /// Path to the wkhtmltopdf executable
    #[arg(long, global = true, value_name = "PATH", env = "WKPDF_EXECUTABLE")]
    wkhtmltopdf: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Markdown or HTML file to PDF
    Render {
        #[command(flatten)]
        request: RequestArgs,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Abort after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Print the wkhtmltopdf arguments without running it
    Args {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Save the job as JSON so it can be replayed later
    Export {
        #[command(flatten)]
        request: RequestArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Render a job saved with `export`
    Replay {
        /// Job file
        #[arg(value_name = "JSON")]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Abort after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Show version information
    Version,
}

/// Options shared by the commands that build a job from a source file.
#[derive(Args, Debug, Default)]
struct RequestArgs {
    /// Markdown or HTML file ("-" for stdin)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Input type (guessed from the file extension when omitted)
    #[arg(long, value_enum)]
    input_type: Option<InputKind>,

    /// CSS theme applied to every page
    #[arg(long, value_name = "FILE")]
    theme: Option<String>,

    /// Header HTML file
    #[arg(long, value_name = "FILE")]
    header: Option<String>,

    /// Footer HTML file
    #[arg(long, value_name = "FILE")]
    footer: Option<String>,

    /// Cover HTML file
    #[arg(long, value_name = "FILE")]
    cover: Option<String>,

    /// Skip the leading H1/H2 block of Markdown input
    #[arg(long)]
    skip_title: bool,

    /// Top margin (e.g. 25mm, 1in)
    #[arg(long)]
    margin_top: Option<String>,

    /// Bottom margin
    #[arg(long)]
    margin_bottom: Option<String>,

    /// Left margin
    #[arg(long)]
    margin_left: Option<String>,

    /// Right margin
    #[arg(long)]
    margin_right: Option<String>,

    /// Page size (e.g. A4, Letter)
    #[arg(long)]
    page_size: Option<String>,

    /// Page orientation
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Document title
    #[arg(long)]
    title: Option<String>,

    /// Header/footer replacement (key=value), repeatable
    #[arg(long, value_name = "KEY=VALUE")]
    replace: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum InputKind {
    /// CommonMark Markdown
    Markdown,
    /// HTML
    Html,
}

impl From<InputKind> for InputType {
    fn from(kind: InputKind) -> Self {
        match kind {
            InputKind::Markdown => InputType::Markdown,
            InputKind::Html => InputType::Html,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OrientationArg {
    /// Portrait
    Portrait,
    /// Landscape
    Landscape,
}

impl From<OrientationArg> for wkpdf::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => wkpdf::Orientation::Portrait,
            OrientationArg::Landscape => wkpdf::Orientation::Landscape,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Some(path) = cli.wkhtmltopdf {
        wkpdf::executable::set_path(path);
    }

    let result = match cli.command {
        Some(Commands::Render {
            request,
            output,
            timeout,
        }) => cmd_render(&request, &output, timeout),
        Some(Commands::Args { request }) => cmd_args(&request),
        Some(Commands::Export {
            request,
            output,
            compact,
        }) => cmd_export(&request, output.as_deref(), compact),
        Some(Commands::Replay {
            input,
            output,
            timeout,
        }) => cmd_replay(&input, &output, timeout),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: wkpdf render <FILE> -o <OUTPUT>".yellow());
            println!("       wkpdf --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn read_source(input: &Path) -> io::Result<String> {
    if input == Path::new("-") {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        fs::read_to_string(input)
    }
}

fn guess_input_type(input: &Path) -> InputType {
    match input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("html") | Some("htm") | Some("xhtml") => InputType::Html,
        _ => InputType::Markdown,
    }
}

fn build_request(args: &RequestArgs, source: String) -> GenerateRequest {
    let input_type = args
        .input_type
        .map(InputType::from)
        .unwrap_or_else(|| guess_input_type(&args.input));

    GenerateRequest {
        input: source,
        input_type,
        theme: args.theme.clone(),
        header: args.header.clone(),
        footer: args.footer.clone(),
        cover: args.cover.clone(),
        skip_h1_h2: args.skip_title,
        margin_top: args.margin_top.clone(),
        margin_bottom: args.margin_bottom.clone(),
        margin_left: args.margin_left.clone(),
        margin_right: args.margin_right.clone(),
        page_size: args.page_size.clone(),
        orientation: args
            .orientation
            .map(|o| String::from(wkpdf::Orientation::from(o))),
        title: args.title.clone(),
        replace: args.replace.clone(),
    }
}

fn load_document(args: &RequestArgs) -> Result<Document, Box<dyn std::error::Error>> {
    let source = read_source(&args.input)?;
    let request = build_request(args, source);
    log::debug!("building {} job from {}", request.input_type, args.input.display());
    Ok(request.into_document()?)
}

fn cancel_token(timeout: Option<u64>) -> CancelToken {
    match timeout {
        Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
        None => CancelToken::new(),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    pb
}

fn run(
    doc: &mut Document,
    output: &Path,
    timeout: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = spinner("Rendering PDF...");
    let result = doc.create_with_cancel(&cancel_token(timeout));
    pb.finish_and_clear();
    result?;

    doc.write_file(output)?;
    println!(
        "{} {} ({} bytes)",
        "Saved to".green(),
        output.display(),
        doc.bytes().len()
    );
    Ok(())
}

fn cmd_render(
    request: &RequestArgs,
    output: &Path,
    timeout: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = load_document(request)?;
    run(&mut doc, output, timeout)
}

fn cmd_args(request: &RequestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_document(request)?;
    doc.check_duplicate_flags()?;
    for arg in doc.args() {
        println!("{}", arg);
    }
    Ok(())
}

fn cmd_export(
    request: &RequestArgs,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_document(request)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = wkpdf::to_json(&doc, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_replay(
    input: &Path,
    output: &Path,
    timeout: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = wkpdf::load_json_file(input)?;
    println!(
        "{} {} ({} pages)",
        "Loaded".cyan(),
        input.display(),
        doc.pages().len()
    );
    run(&mut doc, output, timeout)
}

fn cmd_version() {
    println!("{} {}", "wkpdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Markdown/HTML to PDF through wkhtmltopdf");
    println!();
    match wkpdf::executable::resolve() {
        Ok(path) => println!("wkhtmltopdf: {}", path.display()),
        Err(e) => println!("wkhtmltopdf: {}", e.to_string().yellow()),
    }
    println!("Repository: {}", "https://github.com/iyulab/wkpdf".dimmed());
    println!("License: MIT");
}
