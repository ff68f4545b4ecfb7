//! Pipeline stages for scanned-PDF conversion.
//!
//! Each submodule implements one step; [`crate::convert`] strings them
//! together and [`crate::batch`] repeats that per document.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ recognize ──▶ assemble ──▶ compress
//! (checks)  (pdfium)   (tesseract)   (lopdf)      (lopdf)
//! ```
//!
//! 1. [`input`]     validate the source PDF and the output location
//! 2. [`render`]    rasterise every page to JPEG inside the [`workspace`]
//! 3. [`recognize`] one searchable single-page PDF per raster
//! 4. [`assemble`]  merge page documents in page order
//! 5. [`compress`]  optional in-place size reduction; failures only warn
//!
//! Data only flows downstream: no stage reads another stage's later output.

pub mod assemble;
pub mod compress;
pub mod input;
pub mod recognize;
pub mod render;
pub mod workspace;
