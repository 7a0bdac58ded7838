//! CLI binary for edgequake-pdf2doc.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, renders the event stream and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2doc::{
    check_tools, convert_stream, reveal, ConversionConfig, ConversionEvent, ConversionRequest,
    ConversionResult, TargetFormat, Tool, ToolReport,
};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # PDF to DOCX on the desktop
  pdf2doc report.pdf

  # ODT into a specific folder, then open the folder
  pdf2doc report.pdf -f odt -o ~/converted --reveal

  # Legacy DOC (needs LibreOffice or unoconv, otherwise DOCX is delivered)
  pdf2doc scan.pdf -f doc

  # Check which external tools are installed
  pdf2doc --check-tools -f doc report.pdf

  # Machine-readable result
  pdf2doc --json report.pdf > result.json

STRATEGIES (tried in order until one produces a non-empty file):
  rich-reconstruction   pdftotext + pdftocairo -svg → HTML → pandoc
  plain-text            pdftotext → Markdown → pandoc
  odt-bridge            pdftotext → ODT → pandoc

REQUIRED TOOLS:
  pdftotext                        sudo apt-get install poppler-utils
  pandoc                           sudo apt-get install pandoc

OPTIONAL TOOLS:
  pdftocairo, pdfinfo (SVG pages)  sudo apt-get install poppler-utils
  libreoffice or unoconv (DOC)     sudo apt-get install libreoffice unoconv

ENVIRONMENT VARIABLES:
  PDF2DOC_FORMAT, PDF2DOC_OUTPUT_DIR, ...   Defaults for the flags above
  PDF2DOC_PDFTOTEXT, PDF2DOC_PANDOC, ...    Program to run for each tool
  RUST_LOG                                  Override log filtering
"#;

/// Convert PDF files to ODT, DOC or DOCX.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2doc",
    version,
    about = "Convert PDF files to editable ODT, DOC or DOCX documents",
    long_about = "Convert a PDF document to an editable word-processor file using poppler-utils \
and pandoc. Several conversion strategies are tried in turn; DOC output additionally needs \
LibreOffice or unoconv and falls back to DOCX with a notice when neither works.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    #[arg(required_unless_present = "check_tools")]
    input: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, env = "PDF2DOC_FORMAT", value_enum, default_value = "docx")]
    format: FormatArg,

    /// Directory to write the document to. Default: the desktop.
    #[arg(short, long = "output-dir", env = "PDF2DOC_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Do not add a table of contents.
    #[arg(long, env = "PDF2DOC_NO_TOC")]
    no_toc: bool,

    /// Do not pass --standalone to pandoc.
    #[arg(long, env = "PDF2DOC_NO_STANDALONE")]
    no_standalone: bool,

    /// Skip vector page rendering; embed extracted text only.
    #[arg(long, env = "PDF2DOC_TEXT_ONLY")]
    text_only: bool,

    /// Report which external tools are available, then exit.
    #[arg(long)]
    check_tools: bool,

    /// Open the output folder in the file browser when done.
    #[arg(long, env = "PDF2DOC_REVEAL")]
    reveal: bool,

    /// Print the ConversionResult as JSON on stdout.
    #[arg(long, env = "PDF2DOC_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "PDF2DOC_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2DOC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2DOC_QUIET")]
    quiet: bool,

    /// pdftotext program.
    #[arg(long, env = "PDF2DOC_PDFTOTEXT", hide_short_help = true)]
    pdftotext: Option<String>,

    /// pdftocairo program.
    #[arg(long, env = "PDF2DOC_PDFTOCAIRO", hide_short_help = true)]
    pdftocairo: Option<String>,

    /// pdfinfo program.
    #[arg(long, env = "PDF2DOC_PDFINFO", hide_short_help = true)]
    pdfinfo: Option<String>,

    /// pandoc program.
    #[arg(long, env = "PDF2DOC_PANDOC", hide_short_help = true)]
    pandoc: Option<String>,

    /// LibreOffice program.
    #[arg(long, env = "PDF2DOC_LIBREOFFICE", hide_short_help = true)]
    libreoffice: Option<String>,

    /// unoconv program.
    #[arg(long, env = "PDF2DOC_UNOCONV", hide_short_help = true)]
    unoconv: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Odt,
    Doc,
    Docx,
}

impl From<FormatArg> for TargetFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Odt => TargetFormat::Odt,
            FormatArg::Doc => TargetFormat::Doc,
            FormatArg::Docx => TargetFormat::Docx,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already shows every step; keep library logs to errors
    // while it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let format = TargetFormat::from(cli.format);
    let config = build_config(&cli)?;

    // ── Tool check ───────────────────────────────────────────────────────
    let report = check_tools(&config, format);
    if cli.check_tools {
        print_report(&report, format);
        return Ok(exit_code(report.is_ready()));
    }
    if let Some(warning) = report.warning() {
        eprintln!("{} {}", red("✘"), warning);
        return Ok(ExitCode::FAILURE);
    }
    if let Some(advisory) = report.advisory() {
        if !cli.quiet && !cli.json {
            eprintln!("{} {}", yellow("⚠"), advisory);
        }
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let input = cli.input.as_deref().context("No input file given")?;
    let request = ConversionRequest::new(input, format).context("Cannot convert input")?;
    let result = run(request, config.clone(), show_progress, cli.quiet || cli.json).await;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialise result")?
        );
    } else if !cli.quiet || !result.succeeded {
        print_summary(&result);
    }

    if cli.reveal && result.succeeded {
        if let Some(dir) = result.output_path.as_deref().and_then(|p| p.parent()) {
            if let Err(e) = reveal(dir, config.runner().as_ref()) {
                eprintln!("{} {}", yellow("⚠"), e);
            }
        }
    }

    Ok(exit_code(result.succeeded))
}

/// Drive the event stream to completion, rendering progress as it arrives.
async fn run(
    request: ConversionRequest,
    config: ConversionConfig,
    show_progress: bool,
    silent: bool,
) -> ConversionResult {
    let bar = show_progress.then(spinner);
    let mut events = convert_stream(request, config);
    let mut result = None;

    while let Some(event) = events.next().await {
        match event {
            ConversionEvent::Finished(r) => result = Some(r),
            ConversionEvent::StrategyStarted {
                ref strategy,
                index,
                total,
            } => {
                if let Some(ref bar) = bar {
                    bar.set_prefix(format!("[{index}/{total}]"));
                    bar.println(format!("{} {}", cyan("◆"), bold(strategy)));
                } else if !silent {
                    eprintln!("[{index}/{total}] {strategy}");
                }
            }
            ConversionEvent::StrategyFailed {
                ref strategy,
                ref detail,
            } => {
                let line = format!("  {} {} {}", red("✗"), strategy, dim(detail));
                match bar {
                    Some(ref bar) => bar.println(line),
                    None if !silent => eprintln!("{line}"),
                    None => {}
                }
            }
            ConversionEvent::Substituted(s) => {
                let line = format!("  {} {}", yellow("⚠"), s);
                match bar {
                    Some(ref bar) => bar.println(line),
                    None if !silent => eprintln!("{line}"),
                    None => {}
                }
            }
            other => {
                if let Some(text) = other.describe() {
                    match bar {
                        Some(ref bar) => bar.set_message(text),
                        None if !silent => eprintln!("  {}", dim(&text)),
                        None => {}
                    }
                }
            }
        }
    }

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    // The stream always ends with `Finished`.
    result.unwrap_or_else(|| {
        ConversionResult::failed("conversion ended without a result", Vec::new(), 0)
    })
}

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Preparing");
    bar.set_message("Validating PDF…");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_summary(result: &ConversionResult) {
    if result.succeeded {
        let path = result
            .output_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        eprintln!(
            "{} {}  {}",
            green("✔"),
            bold(&path),
            dim(&format!(
                "{} · {}ms",
                result.strategy.as_deref().unwrap_or("-"),
                result.duration_ms
            ))
        );
        if let Some(notice) = result.notice() {
            eprintln!("  {} {}", yellow("⚠"), notice);
        }
    } else {
        eprintln!("{} {}", red("✘"), result.message);
        for attempt in &result.attempts {
            if let Some(ref d) = attempt.diagnostic {
                eprintln!("  {} {}", dim(&attempt.strategy), d);
            }
        }
    }
}

fn print_report(report: &ToolReport, format: TargetFormat) {
    println!("Tools for {} output:", format.extension().to_uppercase());
    for tool in &report.available {
        println!("  {} {}", green("✓"), tool);
    }
    for tool in &report.missing_required {
        println!("  {} {} {}", red("✗"), tool, dim("(required)"));
    }
    for tool in &report.missing_optional {
        println!("  {} {} {}", yellow("-"), tool, dim("(optional)"));
    }
    if let Some(w) = report.warning() {
        println!("\n{w}");
    }
    if let Some(a) = report.advisory() {
        println!("\n{a}");
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .table_of_contents(!cli.no_toc)
        .standalone(!cli.no_standalone)
        .vector_pages(!cli.text_only);

    if let Some(ref dir) = cli.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        builder = builder.output_dir(dir);
    }

    let overrides = [
        (Tool::PdfToText, &cli.pdftotext),
        (Tool::PdfToCairo, &cli.pdftocairo),
        (Tool::PdfInfo, &cli.pdfinfo),
        (Tool::Pandoc, &cli.pandoc),
        (Tool::LibreOffice, &cli.libreoffice),
        (Tool::Unoconv, &cli.unoconv),
    ];
    for (tool, program) in overrides {
        if let Some(program) = program {
            builder = builder.tool(tool, program.clone());
        }
    }

    builder.build().context("Invalid configuration")
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
