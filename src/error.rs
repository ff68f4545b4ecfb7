//! Error types for the pdf-ocr library.
//!
//! [`PdfOcrError`] is the only error a caller ever sees. Every variant belongs
//! to one of four kinds (see [`ErrorKind`]):
//!
//! * **Input**: the source file is missing, not a file, or not a PDF.
//! * **Output**: the destination cannot be created or is the wrong kind of
//!   filesystem entry.
//! * **Recognition**: the OCR engine failed on a page (or is not usable).
//! * **Processing**: anything else that went wrong inside one document's
//!   pipeline, wrapping the original cause and naming the input file.
//!
//! Pipeline stages report raw failures through a crate-private `StageError`
//! that is attributed to the input file once the stage returns: raw causes
//! become [`PdfOcrError::Processing`], while the first three kinds pass
//! through untouched.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::backend::RenderError;

/// All errors returned by the pdf-ocr library.
#[derive(Debug, Error)]
pub enum PdfOcrError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// The input path exists but is a directory or another non-file entry.
    #[error("Input path is not a file: {}", path.display())]
    InputNotAFile { path: PathBuf },

    /// The input file does not carry a `.pdf` extension.
    #[error("Input file is not a PDF: {}", path.display())]
    NotAPdf { path: PathBuf },

    // ── Output errors ─────────────────────────────────────────────────────
    /// A missing output directory could not be created.
    #[error("Cannot create output directory '{}': {source}", path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output path exists but is not a regular file.
    #[error("Output path exists but is not a file: {}", path.display())]
    OutputNotAFile { path: PathBuf },

    /// The output directory path exists but is not a directory.
    #[error("Output path exists but is not a directory: {}", path.display())]
    OutputNotADirectory { path: PathBuf },

    /// Several inputs were given together with a single output file.
    #[error("When processing multiple files, output must be a directory: {}", path.display())]
    BatchOutputNotADirectory { path: PathBuf },

    // ── Recognition errors ────────────────────────────────────────────────
    /// The OCR engine failed on a page.
    #[error("OCR processing failed on page {page}: {detail}")]
    Recognition { page: usize, detail: String },

    /// The tesseract binary is not on PATH.
    #[error(
        "Tesseract OCR not found. Please install Tesseract:\n\
  • Windows: https://github.com/UB-Mannheim/tesseract/wiki\n\
  • macOS:   brew install tesseract\n\
  • Linux:   sudo apt-get install tesseract-ocr"
    )]
    TesseractNotFound,

    /// One or more requested recognition languages are not installed.
    #[error(
        "Tesseract language data missing for '{language}': {}\nInstalled languages: {}\n\
Install the matching traineddata, e.g. `sudo apt-get install tesseract-ocr-<lang>`.",
        missing.join(", "),
        installed.join(", ")
    )]
    LanguageUnavailable {
        language: String,
        missing: Vec<String>,
        installed: Vec<String>,
    },

    // ── Processing errors ─────────────────────────────────────────────────
    /// Any other failure while processing one document.
    #[error("Error processing file {}: {source}", path.display())]
    Processing {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDF rendering needs the pdfium shared library. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the working directory.\n\
  • Install it system-wide (see https://github.com/bblanchon/pdfium-binaries).\n"
    )]
    PdfiumUnavailable(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The blocking wrappers could not start their tokio runtime.
    #[error("Failed to create async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// The four error kinds callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Input,
    Output,
    Recognition,
    Processing,
}

impl PdfOcrError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PdfOcrError::InputNotFound { .. }
            | PdfOcrError::InputNotAFile { .. }
            | PdfOcrError::NotAPdf { .. } => ErrorKind::Input,
            PdfOcrError::OutputDirectory { .. }
            | PdfOcrError::OutputNotAFile { .. }
            | PdfOcrError::OutputNotADirectory { .. }
            | PdfOcrError::BatchOutputNotADirectory { .. } => ErrorKind::Output,
            PdfOcrError::Recognition { .. }
            | PdfOcrError::TesseractNotFound
            | PdfOcrError::LanguageUnavailable { .. } => ErrorKind::Recognition,
            PdfOcrError::Processing { .. }
            | PdfOcrError::PdfiumUnavailable(_)
            | PdfOcrError::InvalidConfig(_)
            | PdfOcrError::Runtime(_) => ErrorKind::Processing,
        }
    }
}

/// Raw failure inside a pipeline stage, not yet attributed to an input file.
#[derive(Debug, Error)]
pub(crate) enum StageError {
    /// Already a domain error; passes through normalisation unchanged.
    #[error(transparent)]
    Domain(#[from] PdfOcrError),

    #[error("Failed to convert PDF to images: {0}")]
    Render(#[from] RenderError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF structure error: {0}")]
    Pdf(String),

    #[error("Worker task failed: {0}")]
    Join(String),
}

impl From<lopdf::Error> for StageError {
    fn from(e: lopdf::Error) -> Self {
        StageError::Pdf(e.to_string())
    }
}

impl StageError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        StageError::Io {
            context: context.into(),
            source,
        }
    }

    /// Name the input file on any non-domain failure.
    pub(crate) fn attribute(self, input: &Path) -> PdfOcrError {
        match self {
            StageError::Domain(e) => e,
            other => PdfOcrError::Processing {
                path: input.to_path_buf(),
                source: Box::new(other),
            },
        }
    }
}

/// Await a blocking task, resuming any panic on the caller's task.
///
/// A panic is not part of the error taxonomy, so it is never converted into
/// a `StageError`; it keeps unwinding until something outside the library
/// decides what to do with it.
pub(crate) async fn join_blocking<T>(
    handle: tokio::task::JoinHandle<Result<T, StageError>>,
) -> Result<T, StageError> {
    match handle.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(StageError::Join(e.to_string())),
    }
}
