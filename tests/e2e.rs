//! End-to-end tests against the real tesseract binary and pdfium library.
//!
//! Each test builds its own "scan" (a PDF with large Helvetica text), runs it
//! through the full pipeline and reads the text layer back with pdfium.
//! They are gated behind the `E2E_ENABLED` environment variable so they do
//! not run in CI unless explicitly requested.
//!
//! Run with (add `RUST_LOG=pdf_ocr=info` for less noise):
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture

use lopdf::{dictionary, Document, Object, Stream};
use pdf_ocr::{check_dependencies, ErrorKind, PdfOcr, PdfOcrError, ProcessingOptions};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        init_logging();
    }};
}

/// Library logs on the test output; `RUST_LOG` overrides the filter.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pdf_ocr=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// One page per entry of `lines`, each with a single line of 48pt text.
fn text_pdf(path: &Path, lines: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for line in lines {
        let content = format!("BT /F1 48 Tf 60 600 Td ({line}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn pdfium() -> Pdfium {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) => Pdfium::bind_to_library(p),
        Err(_) => Pdfium::bind_to_system_library(),
    }
    .expect("pdfium library");
    Pdfium::new(bindings)
}

/// Text layer of every page, upper-cased.
fn page_texts(pdf: &Path) -> Vec<String> {
    let pdfium = pdfium();
    let doc = pdfium.load_pdf_from_file(pdf, None).unwrap();
    doc.pages()
        .iter()
        .map(|page| page.text().unwrap().all().to_uppercase())
        .collect()
}

fn pipeline(options: ProcessingOptions) -> PdfOcr {
    let toolchain = check_dependencies(&options).expect("tesseract and pdfium installed");
    PdfOcr::new(options, toolchain)
}

fn workdir() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let scan = dir.path().join("scan.pdf");
    text_pdf(&scan, &["INVOICE 2024", "TOTAL AMOUNT"]);
    (dir, scan)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_scan_becomes_searchable() {
    e2e_skip_unless_ready!();
    let (dir, scan) = workdir();
    let ocr = pipeline(ProcessingOptions::default());

    let out = ocr.process_file(&scan, None).await.unwrap();

    assert_eq!(out, dir.path().join("scan_searchable.pdf"));
    let texts = page_texts(&out);
    println!("{texts:?}");
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("INVOICE"), "page 1: {}", texts[0]);
    assert!(texts[1].contains("TOTAL"), "page 2: {}", texts[1]);
}

#[tokio::test]
async fn e2e_unoptimised_run_at_full_resolution() {
    e2e_skip_unless_ready!();
    let (dir, scan) = workdir();
    let options = ProcessingOptions::builder()
        .resolution(300)
        .optimize_size(false)
        .build()
        .unwrap();
    let ocr = pipeline(options);

    let target = dir.path().join("full/scan.pdf");
    let out = ocr.process_file(&scan, Some(target.as_path())).await.unwrap();

    let texts = page_texts(&out);
    assert!(texts[0].contains("INVOICE"), "page 1: {}", texts[0]);
}

#[tokio::test]
async fn e2e_batch_continues_past_missing_file() {
    e2e_skip_unless_ready!();
    let (dir, scan) = workdir();
    let missing = dir.path().join("missing.pdf");
    let results = dir.path().join("results");
    let ocr = pipeline(ProcessingOptions::builder().concurrency(2).build().unwrap());

    let batch = ocr
        .process_batch(&[scan, missing.clone()], Some(results.as_path()))
        .await
        .unwrap();

    assert_eq!(batch.succeeded, vec![results.join("scan_searchable.pdf")]);
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].input, missing);
    assert_eq!(batch.failures[0].kind, ErrorKind::Input);
}

#[test]
fn e2e_unknown_language_fails_preflight() {
    e2e_skip_unless_ready!();
    let options = ProcessingOptions::builder()
        .language("eng+qqq")
        .build()
        .unwrap();

    let err = check_dependencies(&options).unwrap_err();

    match err {
        PdfOcrError::LanguageUnavailable { missing, .. } => assert_eq!(missing, vec!["qqq"]),
        other => panic!("unexpected error: {other}"),
    }
}
