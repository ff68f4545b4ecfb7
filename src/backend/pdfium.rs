//! [`PageRenderer`] backed by the pdfium C++ library via `pdfium-render`.
//!
//! pdfium keeps thread-local state and is blocking, so callers drive this
//! renderer from `tokio::task::spawn_blocking`. A fresh binding is made per
//! document; the library location is fixed once by [`crate::preflight`].

use super::{PageRenderer, PageSink, RenderError};
use crate::error::PdfOcrError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the pdfium shared library is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfiumLibrary {
    /// An explicit library file.
    Path(PathBuf),
    /// Whatever the dynamic loader finds on the system search path.
    System,
}

/// Renders pages with pdfium.
#[derive(Debug, Clone)]
pub struct PdfiumRenderer {
    library: PdfiumLibrary,
}

impl PdfiumRenderer {
    /// Bind once to prove the library loads, then keep its location.
    pub fn new(library: PdfiumLibrary) -> Result<Self, PdfOcrError> {
        let renderer = Self { library };
        renderer.bind()?;
        Ok(renderer)
    }

    pub fn library(&self) -> &PdfiumLibrary {
        &self.library
    }

    fn bind(&self) -> Result<Pdfium, PdfOcrError> {
        let bindings = match &self.library {
            PdfiumLibrary::Path(path) => Pdfium::bind_to_library(path),
            PdfiumLibrary::System => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| PdfOcrError::PdfiumUnavailable(format!("{e:?}")))?;
        Ok(Pdfium::new(bindings))
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render_pages(
        &self,
        pdf: &Path,
        zoom: f32,
        sink: &mut PageSink<'_>,
    ) -> Result<usize, RenderError> {
        let pdfium = self.bind().map_err(|e| RenderError::Open(e.to_string()))?;

        let document = pdfium
            .load_pdf_from_file(pdf, None)
            .map_err(|e| RenderError::Open(format!("{e:?}")))?;

        let pages = document.pages();
        let total = pages.len() as usize;
        info!("PDF loaded: {} pages", total);

        let render_config = PdfRenderConfig::new().scale_page_by_factor(zoom);

        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page
                .render_with_config(&render_config)
                .map_err(|e| RenderError::Page {
                    page: idx + 1,
                    detail: format!("{e:?}"),
                })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );

            sink(idx, image)?;
        }

        Ok(total)
    }
}
