//! Processing options for scanned-PDF conversion.
//!
//! All pipeline behaviour is controlled through [`ProcessingOptions`], built
//! via its [`ProcessingOptionsBuilder`]. Options are constructed once per
//! [`crate::PdfOcr`] and never change afterwards, so a batch applies exactly
//! the same settings to every document.

use crate::error::PdfOcrError;
use crate::progress::ProgressCallback;
use crate::backend::RecognitionMode;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Resolution ceiling used for recognition when size optimisation is on.
///
/// Tesseract accuracy stops improving around 200 DPI while raster size keeps
/// growing quadratically.
pub const OPTIMIZED_DPI_CEILING: u32 = 200;

/// Native PDF user-space resolution: one point is 1/72 inch.
pub const BASE_DPI: f32 = 72.0;

/// JPEG quality for page rasters.
pub const JPEG_QUALITY: u8 = 85;

/// Suffix appended to the input stem when no output path is given.
pub const OUTPUT_SUFFIX: &str = "_searchable.pdf";

const MAX_RESOLUTION: u32 = 1200;

/// Tesseract language or script models, optionally joined with `+`
/// (e.g. `eng+deu`, `script/Latin`).
static LANGUAGE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_/-]+(\+[A-Za-z0-9_/-]+)*$").unwrap());

/// Options for a scanned-PDF conversion.
///
/// # Example
/// ```rust
/// use pdf_ocr::ProcessingOptions;
///
/// let options = ProcessingOptions::builder()
///     .resolution(300)
///     .language("eng+deu")
///     .optimize_size(true)
///     .build()
///     .unwrap();
/// assert_eq!(options.effective_dpi(), 200);
/// ```
#[derive(Clone, Serialize)]
pub struct ProcessingOptions {
    /// Rasterisation resolution in DPI. Default: 300.
    pub resolution: u32,

    /// Tesseract language tag, e.g. `eng` or `eng+fra`. Default: `eng`.
    pub language: String,

    /// Trade recognition resolution down to at most 200 DPI and recompress
    /// the assembled output. Default: true.
    pub optimize_size: bool,

    /// Pages recognised at once. Default: 1 (strictly sequential).
    ///
    /// Output page order is always the rasterisation order, whatever this is
    /// set to.
    pub concurrency: usize,

    /// Optional progress events receiver.
    #[serde(skip)]
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            resolution: 300,
            language: "eng".to_string(),
            optimize_size: true,
            concurrency: 1,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ProcessingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingOptions")
            .field("resolution", &self.resolution)
            .field("language", &self.language)
            .field("optimize_size", &self.optimize_size)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn OcrProgressCallback>"),
            )
            .finish()
    }
}

impl ProcessingOptions {
    /// Create a new builder for `ProcessingOptions`.
    pub fn builder() -> ProcessingOptionsBuilder {
        ProcessingOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Resolution actually used to rasterise pages for recognition.
    pub fn effective_dpi(&self) -> u32 {
        if self.optimize_size {
            self.resolution.min(OPTIMIZED_DPI_CEILING)
        } else {
            self.resolution
        }
    }

    /// Uniform page scale factor applied by the rasteriser.
    pub fn zoom(&self) -> f32 {
        self.effective_dpi() as f32 / BASE_DPI
    }

    /// Engine output mode matching the optimisation flag.
    pub fn recognition_mode(&self) -> RecognitionMode {
        if self.optimize_size {
            RecognitionMode::SizeOptimized
        } else {
            RecognitionMode::Standard
        }
    }

    /// Individual language codes of the `+`-joined tag.
    pub fn language_codes(&self) -> Vec<&str> {
        self.language.split('+').collect()
    }
}

/// Builder for [`ProcessingOptions`].
#[derive(Debug)]
pub struct ProcessingOptionsBuilder {
    options: ProcessingOptions,
}

impl ProcessingOptionsBuilder {
    pub fn resolution(mut self, dpi: u32) -> Self {
        self.options.resolution = dpi;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.options.language = language.into();
        self
    }

    pub fn optimize_size(mut self, v: bool) -> Self {
        self.options.optimize_size = v;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.options.concurrency = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.options.progress_callback = Some(cb);
        self
    }

    /// Build the options, validating constraints.
    pub fn build(self) -> Result<ProcessingOptions, PdfOcrError> {
        let o = &self.options;
        if o.resolution == 0 || o.resolution > MAX_RESOLUTION {
            return Err(PdfOcrError::InvalidConfig(format!(
                "resolution must be 1–{MAX_RESOLUTION} DPI, got {}",
                o.resolution
            )));
        }
        if !LANGUAGE_TAG.is_match(&o.language) {
            return Err(PdfOcrError::InvalidConfig(format!(
                "language must be tesseract codes joined with '+', got '{}'",
                o.language
            )));
        }
        Ok(self.options)
    }
}
