//! CLI binary for pdf-ocr.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ProcessingOptions`, runs the pre-flight checks once, and reports the
//! batch outcome.
//!
//! Exit codes: 0 when the run finished (individual document failures are
//! listed in the summary), 1 on a configuration, dependency or
//! single-document error, 2 on Ctrl-C, 3 on anything unexpected.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_ocr::{
    check_dependencies, BatchResult, OcrProgressCallback, PdfOcr, PdfOcrError, ProcessingOptions,
    ProgressCallback,
};
use std::any::Any;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const EXIT_DOMAIN_ERROR: u8 = 1;
const EXIT_INTERRUPTED: u8 = 2;
const EXIT_UNEXPECTED: u8 = 3;

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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar over the pages of the current document and a
/// log line per finished or failed document.
struct CliProgressCallback {
    bar: ProgressBar,
    empty_pages: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: ProgressBar::new(0),
            empty_pages: AtomicUsize::new(0),
        })
    }

    /// Spinner shown while a document is being rasterised.
    fn start_spinner(&self, name: &str) {
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        self.bar.reset();
        self.bar.set_style(style);
        self.bar.set_prefix("Rendering");
        self.bar.set_message(name.to_string());
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    /// Switch to the page bar once the page count is known.
    fn activate_bar(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(style);
        self.bar.set_prefix("OCR");
        self.bar.reset_eta();
    }
}

impl OcrProgressCallback for CliProgressCallback {
    fn on_document_start(&self, input: &Path, output: &Path) {
        self.empty_pages.store(0, Ordering::SeqCst);
        // The bar of the previous document has been cleared by now.
        eprintln!(
            "{} {}  {}",
            cyan("◆"),
            bold(&input.display().to_string()),
            dim(&format!("→ {}", output.display())),
        );
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.start_spinner(&name);
    }

    fn on_pages_rendered(&self, total_pages: usize) {
        self.activate_bar(total_pages);
    }

    fn on_page_start(&self, page_num: usize, _total_pages: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, _page_num: usize, _total_pages: usize) {
        self.bar.inc(1);
    }

    fn on_page_empty(&self, page_num: usize) {
        self.empty_pages.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Page {:>3}  {}",
            yellow("⚠"),
            page_num,
            dim("OCR produced no page, skipped"),
        ));
    }

    fn on_document_complete(&self, output: &Path, pages_written: usize) {
        self.bar.finish_and_clear();
        let empty = self.empty_pages.load(Ordering::SeqCst);
        let pages = if empty == 0 {
            format!("{pages_written} pages")
        } else {
            format!("{pages_written} pages, {empty} empty")
        };
        eprintln!(
            "  {} {}  {}",
            green("✓"),
            output.display(),
            dim(&pages)
        );
    }

    fn on_document_failed(&self, input: &Path, message: &str) {
        self.bar.finish_and_clear();
        eprintln!("  {} {}  {}", red("✗"), input.display(), red(message));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One document, written next to it as scan_searchable.pdf
  pdf-ocr scan.pdf

  # Explicit output file, German and English text
  pdf-ocr scan.pdf -o out/searchable.pdf -l deu+eng

  # Several documents into one directory, full resolution, no recompression
  pdf-ocr a.pdf b.pdf c.pdf -o searchable/ -d 400 --no-optimize

  # Machine-readable summary
  pdf-ocr *.pdf -o searchable/ --json > result.json

REQUIREMENTS:
  tesseract   on PATH, with traineddata for every requested language
              (`tesseract --list-langs` shows what is installed)
  pdfium      shared library, found via PDFIUM_LIB_PATH, the working
              directory, or the system library path

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to an existing libpdfium
  RUST_LOG          Override the log filter (e.g. pdf_ocr=debug)

EXIT CODES:
  0  finished (failed documents in a batch are listed in the summary)
  1  invalid options, missing dependency, or the single document failed
  2  interrupted with Ctrl-C
  3  unexpected internal error
"#;

/// Turn scanned PDF documents into searchable PDFs with Tesseract OCR.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-ocr",
    version,
    about = "Turn scanned PDF documents into searchable PDFs with Tesseract OCR",
    long_about = "Rasterise every page of a scanned PDF, recognise it with Tesseract and \
reassemble the pages into a PDF with an invisible, selectable text layer over the original \
images.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Scanned PDF file(s).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file (one input) or directory (several inputs).
    #[arg(short, long, env = "PDF_OCR_OUTPUT")]
    output: Option<PathBuf>,

    /// Rasterisation resolution in DPI (1–1200).
    #[arg(short = 'd', long, env = "PDF_OCR_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(1..=1200))]
    dpi: u32,

    /// Tesseract language(s), joined with '+', e.g. eng+fra.
    #[arg(short = 'l', long, env = "PDF_OCR_LANGUAGE", default_value = "eng")]
    language: String,

    /// Keep the full resolution for OCR and skip recompression.
    #[arg(long, env = "PDF_OCR_NO_OPTIMIZE")]
    no_optimize: bool,

    /// Pages recognised at once.
    #[arg(short = 'j', long, env = "PDF_OCR_JOBS", default_value_t = 1)]
    jobs: usize,

    /// Print the batch result as JSON on stdout.
    #[arg(long, env = "PDF_OCR_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF_OCR_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF_OCR_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF_OCR_QUIET")]
    quiet: bool,
}

/// What the spawned task does.
enum Job {
    Single {
        input: PathBuf,
        output: Option<PathBuf>,
    },
    Batch {
        inputs: Vec<PathBuf>,
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", red("✘"), e);
            if e.downcast_ref::<PdfOcrError>().is_some() {
                ExitCode::from(EXIT_DOMAIN_ERROR)
            } else {
                ExitCode::from(EXIT_UNEXPECTED)
            }
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
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

    // ── Build options ────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);

    let mut builder = ProcessingOptions::builder()
        .resolution(cli.dpi)
        .language(&cli.language)
        .optimize_size(!cli.no_optimize)
        .concurrency(cli.jobs);
    if let Some(cb) = &progress {
        builder = builder.progress_callback(Arc::clone(cb) as ProgressCallback);
    }
    let options = builder.build()?;

    let job = plan_job(&cli)?;

    // ── Pre-flight ───────────────────────────────────────────────────────
    let toolchain = tokio::task::block_in_place(|| check_dependencies(&options))?;
    let ocr = Arc::new(PdfOcr::new(options, toolchain));

    // ── Run ──────────────────────────────────────────────────────────────
    let mut handle = tokio::spawn(async move {
        match job {
            Job::Single { input, output } => {
                let written = ocr.process_file(&input, output.as_deref()).await?;
                Ok::<_, PdfOcrError>(BatchResult {
                    succeeded: vec![written],
                    failures: Vec::new(),
                })
            }
            Job::Batch { inputs, output_dir } => {
                ocr.process_batch(&inputs, output_dir.as_deref()).await
            }
        }
    });

    let joined = tokio::select! {
        joined = &mut handle => joined,
        _ = tokio::signal::ctrl_c() => {
            handle.abort();
            // Wait for the task to unwind so its workspace is removed.
            let _ = handle.await;
            if let Some(cb) = &progress {
                cb.bar.finish_and_clear();
            }
            eprintln!("{} Interrupted", yellow("⚠"));
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
    };

    if let Some(cb) = &progress {
        cb.bar.finish_and_clear();
    }

    let result = match joined {
        Ok(result) => result?,
        Err(e) if e.is_panic() => {
            eprintln!(
                "{} Unexpected error: {}",
                red("✘"),
                panic_message(e.into_panic().as_ref())
            );
            return Ok(ExitCode::from(EXIT_UNEXPECTED));
        }
        Err(e) => anyhow::bail!("Processing task failed: {e}"),
    };

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialise result")?
        );
    } else if !cli.quiet {
        print_summary(&result);
    }

    Ok(ExitCode::SUCCESS)
}

/// Decide between a single-document run and a batch.
///
/// With several inputs `-o` names a directory; an existing file there is
/// rejected before anything runs.
fn plan_job(cli: &Cli) -> Result<Job, PdfOcrError> {
    if let [input] = cli.inputs.as_slice() {
        return Ok(Job::Single {
            input: input.clone(),
            output: cli.output.clone(),
        });
    }

    if let Some(dir) = &cli.output {
        if dir.exists() && !dir.is_dir() {
            return Err(PdfOcrError::BatchOutputNotADirectory { path: dir.clone() });
        }
    }
    Ok(Job::Batch {
        inputs: cli.inputs.clone(),
        output_dir: cli.output.clone(),
    })
}

fn print_summary(result: &BatchResult) {
    let marker = if result.failures.is_empty() {
        green("✔")
    } else if result.succeeded.is_empty() {
        red("✘")
    } else {
        cyan("⚠")
    };
    eprintln!(
        "{} Successfully processed {} out of {} files",
        marker,
        bold(&result.succeeded.len().to_string()),
        result.total()
    );
    if !result.failures.is_empty() {
        eprintln!("Failed files:");
        for failure in &result.failures {
            eprintln!("  {} {}", red("✗"), failure.message);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
