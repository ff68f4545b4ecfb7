//! Input and output location checks.
//!
//! Validation runs before any workspace exists. An invalid input never
//! causes a filesystem write; output validation only ever creates missing
//! directories.

use crate::config::OUTPUT_SUFFIX;
use crate::error::PdfOcrError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Check that `path` exists, is a regular file and ends in `.pdf`
/// (case-insensitive).
pub fn validate_input(path: &Path) -> Result<(), PdfOcrError> {
    if !path.exists() {
        return Err(PdfOcrError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(PdfOcrError::InputNotAFile {
            path: path.to_path_buf(),
        });
    }
    if !has_pdf_extension(path) {
        return Err(PdfOcrError::NotAPdf {
            path: path.to_path_buf(),
        });
    }
    debug!("Validated input PDF: {}", path.display());
    Ok(())
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// `<dir>/<stem>_searchable.pdf` for an input `<dir>/<stem>.pdf`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new(""));
    parent.join(searchable_file_name(input))
}

/// `<stem>_searchable.pdf`.
pub fn searchable_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}{OUTPUT_SUFFIX}")
}

/// Make sure an output file can be written at `path`.
///
/// A missing parent directory is created. An existing entry that is not a
/// regular file is rejected.
pub fn prepare_output_file(path: &Path) -> Result<(), PdfOcrError> {
    create_parent(path)?;
    if path.exists() && !path.is_file() {
        return Err(PdfOcrError::OutputNotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Make sure `path` is (or becomes) a directory.
pub fn prepare_output_dir(path: &Path) -> Result<(), PdfOcrError> {
    create_parent(path)?;
    if path.exists() && !path.is_dir() {
        return Err(PdfOcrError::OutputNotADirectory {
            path: path.to_path_buf(),
        });
    }
    std::fs::create_dir_all(path).map_err(|source| PdfOcrError::OutputDirectory {
        path: path.to_path_buf(),
        source,
    })
}

fn create_parent(path: &Path) -> Result<(), PdfOcrError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|source| PdfOcrError::OutputDirectory {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn missing_input_is_an_input_error() {
        let err = validate_input(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, PdfOcrError::InputNotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn directory_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("scans.pdf");
        std::fs::create_dir(&sub).unwrap();
        let err = validate_input(&sub).unwrap_err();
        assert!(matches!(err, PdfOcrError::InputNotAFile { .. }));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let upper = dir.path().join("SCAN.PDF");
        let txt = dir.path().join("scan.txt");
        std::fs::write(&upper, b"%PDF-1.4").unwrap();
        std::fs::write(&txt, b"%PDF-1.4").unwrap();
        validate_input(&upper).unwrap();
        assert!(matches!(
            validate_input(&txt).unwrap_err(),
            PdfOcrError::NotAPdf { .. }
        ));
    }

    #[test]
    fn default_output_sits_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("/scans/invoice.pdf")),
            PathBuf::from("/scans/invoice_searchable.pdf")
        );
        assert_eq!(
            default_output_path(Path::new("invoice.PDF")),
            PathBuf::from("invoice_searchable.pdf")
        );
    }

    #[test]
    fn output_file_parent_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a/b/out.pdf");
        prepare_output_file(&out).unwrap();
        assert!(dir.path().join("a/b").is_dir());
        assert!(!out.exists());
    }

    #[test]
    fn output_file_that_is_a_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = prepare_output_file(dir.path()).unwrap_err();
        assert!(matches!(err, PdfOcrError::OutputNotAFile { .. }));
        assert_eq!(err.kind(), ErrorKind::Output);
    }

    #[test]
    fn output_dir_that_is_a_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("out");
        std::fs::write(&file, b"x").unwrap();
        let err = prepare_output_dir(&file).unwrap_err();
        assert!(matches!(err, PdfOcrError::OutputNotADirectory { .. }));
    }

    #[test]
    fn output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/results");
        prepare_output_dir(&out).unwrap();
        assert!(out.is_dir());
    }
}
