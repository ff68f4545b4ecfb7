//! Single-document pipeline.
//!
//! [`PdfOcr::process_file`] runs one scanned PDF through
//!
//! ```text
//! validate ──▶ rasterise ──▶ OCR per page ──▶ assemble ──▶ compress?
//! ```
//!
//! The blocking stages (pdfium, tesseract, lopdf) run on tokio's blocking
//! pool. Everything intermediate lives in a [`Workspace`] that is removed
//! when the run ends, whether it succeeds, fails, or is cancelled.

use crate::config::ProcessingOptions;
use crate::error::{join_blocking, PdfOcrError, StageError};
use crate::pipeline::workspace::Workspace;
use crate::pipeline::{assemble, compress, input, recognize, render};
use crate::preflight::Toolchain;
use crate::progress::ProgressCallback;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

/// Converts scanned PDFs into searchable PDFs.
///
/// Holds one immutable set of [`ProcessingOptions`] and the external
/// [`Toolchain`] checked by [`crate::check_dependencies`].
///
/// # Example
/// ```rust,no_run
/// use pdf_ocr::{check_dependencies, PdfOcr, ProcessingOptions};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = ProcessingOptions::builder().language("eng+deu").build()?;
/// let toolchain = check_dependencies(&options)?;
/// let ocr = PdfOcr::new(options, toolchain);
///
/// let output = ocr.process_file(Path::new("scan.pdf"), None).await?;
/// println!("wrote {}", output.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PdfOcr {
    options: ProcessingOptions,
    toolchain: Toolchain,
}

impl PdfOcr {
    pub fn new(options: ProcessingOptions, toolchain: Toolchain) -> Self {
        Self { options, toolchain }
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    pub(crate) fn callback(&self) -> Option<&ProgressCallback> {
        self.options.progress_callback.as_ref()
    }

    /// Produce a searchable copy of `input`.
    ///
    /// When `output` is `None` the result is written next to the input as
    /// `<stem>_searchable.pdf`. An existing file at the output path is
    /// replaced.
    ///
    /// # Returns
    /// The path of the written PDF.
    ///
    /// # Errors
    /// Input and output problems are reported before any work starts.
    /// Recognition failures pass through as
    /// [`PdfOcrError::Recognition`]; anything else becomes
    /// [`PdfOcrError::Processing`] naming `input`. Compression never fails
    /// a run.
    pub async fn process_file(
        &self,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<PathBuf, PdfOcrError> {
        let start = Instant::now();
        info!("Processing: {}", input.display());

        input::validate_input(input)?;
        let output = match output {
            Some(path) => path.to_path_buf(),
            None => input::default_output_path(input),
        };
        input::prepare_output_file(&output)?;
        info!("Output will be saved to: {}", output.display());

        if let Some(cb) = self.callback() {
            cb.on_document_start(input, &output);
        }

        let pages_written = self
            .run(input, &output)
            .await
            .map_err(|e| e.attribute(input))?;

        info!(
            "Successfully created searchable PDF: {} ({} pages, {}ms)",
            output.display(),
            pages_written,
            start.elapsed().as_millis()
        );
        if let Some(cb) = self.callback() {
            cb.on_document_complete(&output, pages_written);
        }
        Ok(output)
    }

    /// Blocking wrapper around [`process_file`](Self::process_file).
    ///
    /// Creates a temporary tokio runtime internally; do not call it from
    /// inside an async context.
    pub fn process_file_sync(
        &self,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<PathBuf, PdfOcrError> {
        block_on(self.process_file(input, output))?
    }

    async fn run(&self, input: &Path, output: &Path) -> Result<usize, StageError> {
        let workspace = Arc::new(Workspace::create()?);

        // ── Rasterise ────────────────────────────────────────────────────
        info!(
            "Converting PDF to images at {} DPI",
            self.options.effective_dpi()
        );
        let images = {
            let renderer = Arc::clone(&self.toolchain.renderer);
            let ws = Arc::clone(&workspace);
            let pdf = input.to_path_buf();
            let zoom = self.options.zoom();
            join_blocking(spawn_blocking(move || {
                render::rasterize(renderer.as_ref(), &pdf, zoom, &ws)
            }))
            .await?
        };
        let total = images.len();
        if total == 0 {
            warn!("{} has no pages", input.display());
        }
        if let Some(cb) = self.callback() {
            cb.on_pages_rendered(total);
        }

        // ── Recognise ────────────────────────────────────────────────────
        info!("Performing OCR on {} pages", total);
        let mode = self.options.recognition_mode();
        // After the first failure the pages not yet started are abandoned,
        // but the ones already on the blocking pool are drained before the
        // workspace goes away.
        let abandoned = Arc::new(AtomicBool::new(false));
        let mut pages = stream::iter(images.into_iter().enumerate().map(|(idx, image)| {
            let engine = Arc::clone(&self.toolchain.engine);
            let language = self.options.language.clone();
            let cb = self.options.progress_callback.clone();
            let ws = Arc::clone(&workspace);
            let abandoned = Arc::clone(&abandoned);
            let dest = workspace.page_document(idx);
            async move {
                if abandoned.load(Ordering::SeqCst) {
                    return Ok(None);
                }
                let page = idx + 1;
                if let Some(cb) = &cb {
                    cb.on_page_start(page, total);
                }
                let out = dest.clone();
                join_blocking(spawn_blocking(move || {
                    // Keeps the page image alive if the run is dropped mid-call.
                    let _ws = ws;
                    recognize::ocr_page(engine.as_ref(), page, &image, &out, &language, mode)
                }))
                .await?;
                if let Some(cb) = &cb {
                    cb.on_page_complete(page, total);
                }
                Ok::<_, StageError>(Some((idx, dest)))
            }
        }))
        .buffered(self.options.concurrency);

        let mut documents = BTreeMap::new();
        let mut failure = None;
        while let Some(result) = pages.next().await {
            match result {
                Ok(Some((idx, dest))) => {
                    documents.insert(idx, dest);
                }
                Ok(None) => {}
                Err(e) => {
                    abandoned.store(true, Ordering::SeqCst);
                    failure.get_or_insert(e);
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        // ── Assemble ─────────────────────────────────────────────────────
        let report = {
            let pages: Vec<PathBuf> = documents.into_values().collect();
            let dest = output.to_path_buf();
            let cb = self.options.progress_callback.clone();
            join_blocking(spawn_blocking(move || {
                assemble::assemble(&pages, &dest, |page| {
                    if let Some(cb) = &cb {
                        cb.on_page_empty(page);
                    }
                })
            }))
            .await?
        };
        debug!(
            "Assembled {} pages, {} empty",
            report.pages_written,
            report.empty_pages.len()
        );

        // ── Compress ─────────────────────────────────────────────────────
        if self.options.optimize_size {
            info!("Compressing final PDF");
            let dest = output.to_path_buf();
            join_blocking(spawn_blocking(move || {
                Ok(compress::compress_in_place(&dest))
            }))
            .await?;
        }

        Ok(report.pages_written)
    }
}

/// Drive `fut` to completion on a fresh multi-threaded runtime.
pub(crate) fn block_on<F: Future>(fut: F) -> Result<F::Output, PdfOcrError> {
    let runtime = tokio::runtime::Runtime::new().map_err(PdfOcrError::Runtime)?;
    Ok(runtime.block_on(fut))
}
