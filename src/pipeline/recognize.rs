//! Page OCR unit: one page raster in, one searchable single-page PDF out.

use crate::backend::{RecognitionEngine, RecognitionMode};
use crate::error::{PdfOcrError, StageError};
use std::path::Path;
use tracing::debug;

/// Recognise `image` and write the engine's PDF to `output`.
///
/// `page` is 1-indexed and only used to label failures. Engine failures and
/// failures writing its output are reported as [`PdfOcrError::Recognition`]
/// and end the document; they are not retried.
pub(crate) fn ocr_page(
    engine: &dyn RecognitionEngine,
    page: usize,
    image: &Path,
    output: &Path,
    language: &str,
    mode: RecognitionMode,
) -> Result<(), StageError> {
    let pdf = engine
        .recognize_to_pdf(image, language, mode)
        .map_err(|e| PdfOcrError::Recognition {
            page,
            detail: e.to_string(),
        })?;

    std::fs::write(output, &pdf).map_err(|e| PdfOcrError::Recognition {
        page,
        detail: format!("cannot write OCR output to {}: {e}", output.display()),
    })?;
    debug!("Page {}: {} bytes of searchable PDF", page, pdf.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EngineError;
    use crate::error::ErrorKind;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEngine {
        calls: Mutex<Vec<(String, RecognitionMode)>>,
        fail: bool,
    }

    impl RecognitionEngine for RecordingEngine {
        fn recognize_to_pdf(
            &self,
            _image: &Path,
            language: &str,
            mode: RecognitionMode,
        ) -> Result<Vec<u8>, EngineError> {
            self.calls.lock().unwrap().push((language.to_string(), mode));
            if self.fail {
                return Err(EngineError::Failed {
                    program: "tesseract".into(),
                    status: "exit status: 1".into(),
                    stderr: "Error opening data file".into(),
                });
            }
            Ok(b"%PDF-1.5\n%%EOF\n".to_vec())
        }

        fn installed_languages(&self) -> Result<Vec<String>, EngineError> {
            Ok(vec!["eng".into()])
        }
    }

    #[test]
    fn engine_output_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("searchable_page_0.pdf");
        let engine = RecordingEngine::default();

        ocr_page(
            &engine,
            1,
            Path::new("page_0.jpg"),
            &out,
            "eng+fra",
            RecognitionMode::SizeOptimized,
        )
        .unwrap();

        assert!(std::fs::read(&out).unwrap().starts_with(b"%PDF"));
        let calls = engine.calls.lock().unwrap();
        assert_eq!(calls[0], ("eng+fra".to_string(), RecognitionMode::SizeOptimized));
    }

    #[test]
    fn engine_failure_is_a_recognition_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine = RecordingEngine {
            fail: true,
            ..Default::default()
        };

        let err = ocr_page(
            &engine,
            4,
            Path::new("page_3.jpg"),
            &dir.path().join("out.pdf"),
            "eng",
            RecognitionMode::Standard,
        )
        .unwrap_err()
        .attribute(Path::new("scan.pdf"));

        assert_eq!(err.kind(), ErrorKind::Recognition);
        let msg = err.to_string();
        assert!(msg.contains("page 4"), "got: {msg}");
        assert!(msg.contains("Error opening data file"), "got: {msg}");
    }

    #[test]
    fn unwritable_page_output_is_a_recognition_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("gone").join("searchable_page_1.pdf");

        let err = ocr_page(
            &RecordingEngine::default(),
            2,
            Path::new("page_1.jpg"),
            &out,
            "eng",
            RecognitionMode::Standard,
        )
        .unwrap_err()
        .attribute(Path::new("scan.pdf"));

        assert_eq!(err.kind(), ErrorKind::Recognition);
        let msg = err.to_string();
        assert!(msg.contains("page 2"), "got: {msg}");
        assert!(msg.contains("searchable_page_1.pdf"), "got: {msg}");
    }
}
