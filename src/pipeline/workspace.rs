//! Scoped temporary workspace for one document run.
//!
//! Page rasters (`page_{i}.jpg`) and per-page OCR documents
//! (`searchable_page_{i}.pdf`) live only here. The directory is removed when
//! the [`Workspace`] is dropped: on success, on error, and when the owning
//! future is cancelled.

use crate::error::StageError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Temporary directory owned by exactly one pipeline run.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub(crate) fn create() -> Result<Self, StageError> {
        let dir = tempfile::Builder::new()
            .prefix("pdf-ocr-")
            .tempdir()
            .map_err(|e| StageError::io("Cannot create temporary workspace", e))?;
        debug!("Workspace created at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Raster for page `index` (0-based).
    pub fn page_image(&self, index: usize) -> PathBuf {
        self.dir.path().join(format!("page_{index}.jpg"))
    }

    /// Single-page OCR document for page `index` (0-based).
    pub fn page_document(&self, index: usize) -> PathBuf {
        self.dir.path().join(format!("searchable_page_{index}.pdf"))
    }
}
