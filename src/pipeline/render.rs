//! Rasteriser: render every page to an opaque JPEG inside the workspace.
//!
//! Pages are written as they come off the renderer so only one bitmap is in
//! memory at a time. Alpha is dropped before encoding: OCR does not need it
//! and an opaque JPEG is far smaller.

use crate::backend::{PageRenderer, RenderError};
use crate::config::JPEG_QUALITY;
use crate::error::StageError;
use crate::pipeline::workspace::Workspace;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rasterise `pdf` at `zoom` into the workspace.
///
/// # Returns
/// Image paths in page order, index 0 first.
pub(crate) fn rasterize(
    renderer: &dyn PageRenderer,
    pdf: &Path,
    zoom: f32,
    workspace: &Workspace,
) -> Result<Vec<PathBuf>, StageError> {
    let mut images = Vec::new();

    let mut sink = |idx: usize, image: DynamicImage| -> Result<(), RenderError> {
        let path = workspace.page_image(idx);
        write_jpeg(&image, &path).map_err(|source| RenderError::Store {
            page: idx + 1,
            source,
        })?;
        images.push((idx, path));
        Ok(())
    };

    let total = renderer.render_pages(pdf, zoom, &mut sink)?;
    debug!("Rasterised {} of {} pages", images.len(), total);

    images.sort_by_key(|(idx, _)| *idx);
    Ok(images.into_iter().map(|(_, path)| path).collect())
}

/// Encode `image` without alpha as JPEG at [`JPEG_QUALITY`].
pub(crate) fn write_jpeg(image: &DynamicImage, path: &Path) -> Result<(), ImageError> {
    let rgb = image.to_rgb8();
    let file = File::create(path).map_err(ImageError::IoError)?;
    let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
    encoder.encode_image(&rgb)
}
