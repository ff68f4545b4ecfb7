//! Post-assembly compression.
//!
//! Rewrites the output document with deflated streams, unreferenced objects
//! pruned and objects renumbered. Failures are logged and swallowed: the
//! assembled document is already valid, and it is only replaced once a
//! compressed copy has been fully written.

use crate::error::StageError;
use crate::pipeline::assemble::save_atomically;
use lopdf::Document;
use std::path::Path;
use tracing::{debug, warn};

/// Compress `path` in place.
///
/// Returns `true` when the compressed document replaced the original.
pub(crate) fn compress_in_place(path: &Path) -> bool {
    let before = file_len(path);
    match try_compress(path) {
        Ok(()) => {
            debug!(
                "Compressed {} ({} → {} bytes)",
                path.display(),
                before,
                file_len(path)
            );
            true
        }
        Err(e) => {
            warn!("PDF compression failed for {}: {}", path.display(), e);
            false
        }
    }
}

fn try_compress(path: &Path) -> Result<(), StageError> {
    let mut doc = Document::load(path)?;
    doc.delete_zero_length_streams();
    doc.prune_objects();
    doc.renumber_objects();
    doc.compress();
    save_atomically(&mut doc, path)
}

fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
