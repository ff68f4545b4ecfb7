//! Progress-callback trait for per-document and per-page events.
//!
//! Inject an [`Arc<dyn OcrProgressCallback>`] via
//! [`crate::config::ProcessingOptionsBuilder::progress_callback`] to receive
//! events while the pipeline works. A terminal progress bar, a GUI log pane,
//! or a job record can all sit behind this trait; the library never knows
//! how the host presents them.
//!
//! # Example
//!
//! ```rust
//! use pdf_ocr::{OcrProgressCallback, ProcessingOptions};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl OcrProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("OCR {page_num}/{total_pages}");
//!     }
//! }
//!
//! let options = ProcessingOptions::builder()
//!     .progress_callback(Arc::new(CountingCallback { pages: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as it processes documents and pages.
///
/// Implementations must be `Send + Sync`: with `concurrency > 1` the page
/// events arrive from several blocking-pool threads. Every method has a
/// no-op default. Page numbers are 1-indexed.
pub trait OcrProgressCallback: Send + Sync {
    /// A document passed validation and is about to be rasterised.
    fn on_document_start(&self, input: &Path, output: &Path) {
        let _ = (input, output);
    }

    /// All pages of the current document have been rasterised.
    fn on_pages_rendered(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Recognition of a page is starting.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// A page has been recognised.
    fn on_page_complete(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Recognition produced a document with no pages; it will be left out.
    fn on_page_empty(&self, page_num: usize) {
        let _ = page_num;
    }

    /// The searchable PDF has been written.
    fn on_document_complete(&self, output: &Path, pages_written: usize) {
        let _ = (output, pages_written);
    }

    /// A document failed inside a batch; the batch moves on.
    fn on_document_failed(&self, input: &Path, message: &str) {
        let _ = (input, message);
    }

    /// A batch finished.
    fn on_batch_complete(&self, succeeded: usize, total: usize) {
        let _ = (succeeded, total);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl OcrProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ProcessingOptions`].
pub type ProgressCallback = Arc<dyn OcrProgressCallback>;
