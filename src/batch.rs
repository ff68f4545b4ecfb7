//! Batch orchestration over several input PDFs.
//!
//! Documents are processed one after another, each in its own workspace.
//! A [`PdfOcrError`] on one document is recorded and the batch moves on. A
//! panic is not recorded: it unwinds out of [`PdfOcr::process_batch`] and
//! ends the batch.

use crate::convert::{block_on, PdfOcr};
use crate::error::{ErrorKind, PdfOcrError};
use crate::pipeline::input;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    /// Written outputs, in input order.
    pub succeeded: Vec<PathBuf>,
    /// Documents that failed, in input order.
    pub failures: Vec<BatchFailure>,
}

/// One document that failed inside a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

impl BatchResult {
    /// Number of documents attempted.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }

    /// `true` when no document failed.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl PdfOcr {
    /// Process `inputs` in order.
    ///
    /// With `output_dir`, the directory is validated (and created) once up
    /// front and every output is written there as `<stem>_searchable.pdf`.
    /// Without it, each output lands next to its input.
    ///
    /// # Errors
    /// Only an unusable `output_dir` fails the batch itself; per-document
    /// failures are collected in [`BatchResult::failures`].
    pub async fn process_batch<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        output_dir: Option<&Path>,
    ) -> Result<BatchResult, PdfOcrError> {
        if let Some(dir) = output_dir {
            input::prepare_output_dir(dir)?;
        }

        let mut result = BatchResult::default();
        for path in inputs {
            let path = path.as_ref();
            let output =
                output_dir.map(|dir| dir.join(input::searchable_file_name(path)));

            match self.process_file(path, output.as_deref()).await {
                Ok(written) => result.succeeded.push(written),
                Err(e) => {
                    let message = e.to_string();
                    error!("Error processing {}: {}", path.display(), message);
                    if let Some(cb) = self.callback() {
                        cb.on_document_failed(path, &message);
                    }
                    result.failures.push(BatchFailure {
                        input: path.to_path_buf(),
                        kind: e.kind(),
                        message,
                    });
                }
            }
        }

        info!(
            "Successfully processed {} out of {} files",
            result.succeeded.len(),
            result.total()
        );
        for failure in &result.failures {
            info!("  {}: {}", failure.input.display(), failure.message);
        }
        if let Some(cb) = self.callback() {
            cb.on_batch_complete(result.succeeded.len(), result.total());
        }
        Ok(result)
    }

    /// Blocking wrapper around [`process_batch`](Self::process_batch).
    pub fn process_batch_sync<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        output_dir: Option<&Path>,
    ) -> Result<BatchResult, PdfOcrError> {
        block_on(self.process_batch(inputs, output_dir))?
    }
}
