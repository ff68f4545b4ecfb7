//! # pdf-ocr
//!
//! Turn scanned PDF documents into searchable PDFs.
//!
//! Every page is rasterised, run through Tesseract, and the resulting
//! single-page PDFs (original raster plus an invisible, aligned text layer)
//! are stitched back together into one document that can be searched,
//! selected and copied from.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Validate   input must be an existing .pdf file; output location checked
//!  ├─ 2. Render     rasterise pages via pdfium to JPEG (spawn_blocking)
//!  ├─ 3. OCR        tesseract per page → single-page searchable PDF
//!  ├─ 4. Assemble   concatenate page documents in page order (lopdf)
//!  └─ 5. Compress   deflate streams, drop dead objects (optional, advisory)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_ocr::{check_dependencies, PdfOcr, ProcessingOptions};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ProcessingOptions::builder()
//!         .resolution(300)
//!         .language("eng")
//!         .build()?;
//!     let toolchain = check_dependencies(&options)?;
//!     let ocr = PdfOcr::new(options, toolchain);
//!
//!     let batch = ocr
//!         .process_batch(&["a.pdf", "b.pdf"], Some(Path::new("searchable/")))
//!         .await?;
//!     eprintln!("{} of {} documents converted", batch.succeeded.len(), batch.total());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-ocr` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf-ocr = { version = "0.3", default-features = false }
//! ```
//!
//! ## Size vs. fidelity
//!
//! With `optimize_size` (the default) pages are recognised at no more than
//! 200 DPI and the assembled document is recompressed. Tesseract's accuracy
//! barely moves above 200 DPI; the file size does.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;
pub mod preflight;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{
    EngineError, PageRenderer, PageSink, PdfiumRenderer, RecognitionEngine, RecognitionMode,
    RenderError, TesseractEngine,
};
pub use batch::{BatchFailure, BatchResult};
pub use config::{ProcessingOptions, ProcessingOptionsBuilder};
pub use convert::PdfOcr;
pub use error::{ErrorKind, PdfOcrError};
pub use preflight::{check_dependencies, Toolchain};
pub use progress::{NoopProgressCallback, OcrProgressCallback, ProgressCallback};
