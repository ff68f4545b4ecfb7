//! Dependency checks run once before any document is touched.
//!
//! Nothing in the library probes the environment behind the caller's back:
//! [`check_dependencies`] is the single place that looks for tesseract,
//! its language data, and the pdfium library. It hands back a [`Toolchain`]
//! that [`crate::PdfOcr::new`] consumes. Tests build a `Toolchain` from
//! fakes with [`Toolchain::new`] and never call this module.

use crate::backend::pdfium::PdfiumLibrary;
use crate::backend::{PageRenderer, PdfiumRenderer, RecognitionEngine, TesseractEngine};
use crate::config::ProcessingOptions;
use crate::error::PdfOcrError;
use pdfium_render::prelude::Pdfium;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Environment variable pointing at an existing pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// The two external capabilities a pipeline needs.
#[derive(Clone)]
pub struct Toolchain {
    pub renderer: Arc<dyn PageRenderer>,
    pub engine: Arc<dyn RecognitionEngine>,
}

impl Toolchain {
    pub fn new(renderer: Arc<dyn PageRenderer>, engine: Arc<dyn RecognitionEngine>) -> Self {
        Self { renderer, engine }
    }
}

impl fmt::Debug for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolchain")
            .field("renderer", &"<dyn PageRenderer>")
            .field("engine", &"<dyn RecognitionEngine>")
            .finish()
    }
}

/// Verify tesseract, the requested languages, and pdfium.
///
/// # Errors
/// - [`PdfOcrError::TesseractNotFound`]: no `tesseract` on PATH
/// - [`PdfOcrError::LanguageUnavailable`]: a requested language has no data
/// - [`PdfOcrError::PdfiumUnavailable`]: pdfium could not be loaded
pub fn check_dependencies(options: &ProcessingOptions) -> Result<Toolchain, PdfOcrError> {
    let tesseract = which::which("tesseract").map_err(|_| PdfOcrError::TesseractNotFound)?;
    info!("Using tesseract at {}", tesseract.display());
    let engine = TesseractEngine::new(tesseract);

    check_languages(&engine, options)?;

    let renderer = PdfiumRenderer::new(locate_pdfium())?;
    debug!("pdfium bound from {:?}", renderer.library());

    Ok(Toolchain::new(Arc::new(renderer), Arc::new(engine)))
}

/// Confirm every `+`-joined code has language data installed.
///
/// If the engine cannot list its languages the check is skipped with a
/// warning; recognition itself will then report the real problem.
pub fn check_languages(
    engine: &dyn RecognitionEngine,
    options: &ProcessingOptions,
) -> Result<(), PdfOcrError> {
    let installed = match engine.installed_languages() {
        Ok(langs) => langs,
        Err(e) => {
            warn!("Could not list installed OCR languages: {}", e);
            return Ok(());
        }
    };

    let missing: Vec<String> = options
        .language_codes()
        .into_iter()
        .filter(|code| !installed.iter().any(|l| l == code))
        .map(String::from)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PdfOcrError::LanguageUnavailable {
            language: options.language.clone(),
            missing,
            installed,
        })
    }
}

/// `PDFIUM_LIB_PATH`, then the platform library in the working directory,
/// then the system loader path.
fn locate_pdfium() -> PdfiumLibrary {
    if let Ok(p) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        let path = PathBuf::from(p);
        if path.exists() {
            return PdfiumLibrary::Path(path);
        }
        warn!(
            "{} '{}' not found; falling back to default locations",
            PDFIUM_LIB_PATH_ENV,
            path.display()
        );
    }

    let local = PathBuf::from(Pdfium::pdfium_platform_library_name_at_path("./"));
    if local.exists() {
        return PdfiumLibrary::Path(local);
    }

    PdfiumLibrary::System
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{EngineError, RecognitionMode};
    use std::path::Path;

    struct ListingEngine(Result<Vec<String>, ()>);

    impl RecognitionEngine for ListingEngine {
        fn recognize_to_pdf(
            &self,
            _image: &Path,
            _language: &str,
            _mode: RecognitionMode,
        ) -> Result<Vec<u8>, EngineError> {
            Ok(Vec::new())
        }

        fn installed_languages(&self) -> Result<Vec<String>, EngineError> {
            self.0.clone().map_err(|_| EngineError::Failed {
                program: "tesseract".into(),
                status: "exit status: 1".into(),
                stderr: "no tessdata".into(),
            })
        }
    }

    fn options(language: &str) -> ProcessingOptions {
        ProcessingOptions::builder().language(language).build().unwrap()
    }

    #[test]
    fn installed_languages_pass() {
        let engine = ListingEngine(Ok(vec!["eng".into(), "fra".into(), "osd".into()]));
        check_languages(&engine, &options("eng+fra")).unwrap();
    }

    #[test]
    fn missing_language_is_reported() {
        let engine = ListingEngine(Ok(vec!["eng".into()]));
        let err = check_languages(&engine, &options("eng+jpn")).unwrap_err();
        match err {
            PdfOcrError::LanguageUnavailable { missing, .. } => assert_eq!(missing, vec!["jpn"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unlistable_languages_are_not_fatal() {
        let engine = ListingEngine(Err(()));
        check_languages(&engine, &options("eng")).unwrap();
    }
}
