//! [`RecognitionEngine`] that shells out to the `tesseract` command.
//!
//! Tesseract's PDF renderer writes `<outbase>.pdf`, so each call gets its own
//! private temp directory for the output base; the bytes are read back and
//! the directory disappears with the `TempDir` guard.

use super::{EngineError, RecognitionEngine, RecognitionMode};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Tesseract command-line engine.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: PathBuf,
}

impl TesseractEngine {
    /// Use the tesseract executable at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

/// Arguments after `<image> <outbase>`.
fn recognition_args(language: &str, mode: RecognitionMode) -> Vec<String> {
    let mut args = vec!["-l".to_string(), language.to_string()];
    if mode == RecognitionMode::SizeOptimized {
        args.extend(
            ["-c", "tessedit_create_pdf=1", "-c", "textonly_pdf=0"]
                .into_iter()
                .map(String::from),
        );
    }
    args.push("pdf".to_string());
    args
}

/// Parse `tesseract --list-langs` output.
///
/// Current releases print a header (`List of available languages in "…" (N):`)
/// followed by one code per line on stdout. 3.x prints all of it on stderr
/// and leaves stdout empty, so stderr is read when stdout has no codes.
fn parse_language_list(stdout: &str, stderr: &str) -> Vec<String> {
    let codes = |text: &str| -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.ends_with(':'))
            .map(String::from)
            .collect()
    };
    match codes(stdout) {
        found if found.is_empty() => codes(stderr),
        found => found,
    }
}

impl RecognitionEngine for TesseractEngine {
    fn recognize_to_pdf(
        &self,
        image: &Path,
        language: &str,
        mode: RecognitionMode,
    ) -> Result<Vec<u8>, EngineError> {
        let scratch = tempfile::Builder::new()
            .prefix("pdf-ocr-tess")
            .tempdir()
            .map_err(EngineError::Output)?;
        let outbase = scratch.path().join("page");

        let output = Command::new(&self.program)
            .arg(image)
            .arg(&outbase)
            .args(recognition_args(language, mode))
            .output()
            .map_err(|source| EngineError::Launch {
                program: self.program_name(),
                source,
            })?;

        if !output.status.success() {
            return Err(EngineError::Failed {
                program: self.program_name(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let bytes = std::fs::read(outbase.with_extension("pdf")).map_err(EngineError::Output)?;
        debug!("Recognised {} → {} bytes of PDF", image.display(), bytes.len());
        Ok(bytes)
    }

    fn installed_languages(&self) -> Result<Vec<String>, EngineError> {
        let output = Command::new(&self.program)
            .arg("--list-langs")
            .output()
            .map_err(|source| EngineError::Launch {
                program: self.program_name(),
                source,
            })?;

        if !output.status.success() {
            return Err(EngineError::Failed {
                program: self.program_name(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(parse_language_list(
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimised_mode_requests_full_page_layer() {
        let args = recognition_args("eng+fra", RecognitionMode::SizeOptimized);
        assert_eq!(
            args,
            vec![
                "-l",
                "eng+fra",
                "-c",
                "tessedit_create_pdf=1",
                "-c",
                "textonly_pdf=0",
                "pdf"
            ]
        );
    }

    #[test]
    fn standard_mode_uses_engine_defaults() {
        let args = recognition_args("deu", RecognitionMode::Standard);
        assert_eq!(args, vec!["-l", "deu", "pdf"]);
    }

    #[test]
    fn language_list_skips_header() {
        let out = "List of available languages in \"/usr/share/tessdata/\" (3):\neng\nosd\nfra\n";
        assert_eq!(parse_language_list(out, ""), vec!["eng", "osd", "fra"]);
    }

    #[test]
    fn language_list_falls_back_to_stderr() {
        let err = "List of available languages (2):\neng\nscript/Latin\n";
        assert_eq!(parse_language_list("", err), vec!["eng", "script/Latin"]);
        assert_eq!(parse_language_list("deu\n", err), vec!["deu"]);
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let engine = TesseractEngine::new("/nonexistent/tesseract-binary");
        let err = engine.installed_languages().unwrap_err();
        assert!(matches!(err, EngineError::Launch { .. }), "got: {err}");
    }
}
