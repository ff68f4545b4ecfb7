//! External capabilities the pipeline orchestrates but never implements.
//!
//! ```text
//! PageRenderer       open a PDF, walk its pages, rasterise each at a scale
//! RecognitionEngine  image + language + mode  →  single-page PDF bytes
//! ```
//!
//! Both are traits so tests (and alternative backends) can substitute
//! fakes; [`crate::preflight`] produces the real implementations after
//! checking that the underlying libraries and binaries are usable.

pub mod pdfium;
pub mod tesseract;

use image::DynamicImage;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

pub use pdfium::PdfiumRenderer;
pub use tesseract::TesseractEngine;

/// Receives each rendered page: `(page_index_0based, image)`.
pub type PageSink<'a> = dyn FnMut(usize, DynamicImage) -> Result<(), RenderError> + 'a;

/// Renders PDF pages to raster images.
pub trait PageRenderer: Send + Sync {
    /// Render every page of `pdf` in page order, scaled uniformly by `zoom`,
    /// handing each image to `sink` before the next page is rendered.
    ///
    /// Returns the number of pages rendered.
    fn render_pages(
        &self,
        pdf: &Path,
        zoom: f32,
        sink: &mut PageSink<'_>,
    ) -> Result<usize, RenderError>;
}

/// Produces a searchable single-page PDF from a page image.
pub trait RecognitionEngine: Send + Sync {
    /// Recognise `image` in `language` and return the PDF-encoded page with
    /// its invisible text layer.
    fn recognize_to_pdf(
        &self,
        image: &Path,
        language: &str,
        mode: RecognitionMode,
    ) -> Result<Vec<u8>, EngineError>;

    /// Language codes the engine has data for.
    fn installed_languages(&self) -> Result<Vec<String>, EngineError>;
}

/// How the engine lays out its PDF output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionMode {
    /// Engine defaults.
    Standard,
    /// Full page layer with the raster embedded under an aligned text layer.
    SizeOptimized,
}

/// Failure while rendering a document.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document could not be opened or parsed.
    #[error("cannot open document: {0}")]
    Open(String),

    /// A specific page failed to render.
    #[error("page {page}: {detail}")]
    Page { page: usize, detail: String },

    /// A rendered page could not be encoded or written.
    #[error("cannot store image for page {page}: {source}")]
    Store {
        page: usize,
        #[source]
        source: image::ImageError,
    },
}

/// Failure while running the recognition engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process could not be started.
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran and reported failure.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// Engine output could not be read back.
    #[error("cannot read engine output: {0}")]
    Output(#[source] std::io::Error),
}
