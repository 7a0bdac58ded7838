//! End-to-end tests against the real poppler-utils / pandoc installation.
//!
//! They are gated behind the `E2E_ENABLED` environment variable so they do
//! not run in CI unless explicitly requested, and skip themselves when a
//! required tool is not installed.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use edgequake_pdf2doc::{
    check_tools, convert, ConversionConfig, ConversionRequest, TargetFormat, ToolReport,
};
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Build a one-page PDF showing `lines` in Helvetica.
///
/// An empty slice yields a valid PDF with a blank page.
fn minimal_pdf(lines: &[&str]) -> Vec<u8> {
    let mut content = String::from("BT /F1 14 Tf 72 720 Td 18 TL\n");
    for line in lines {
        let escaped = line
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");
        content.push_str(&format!("({escaped}) Tj T*\n"));
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}endstream", content.len(), content),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }
    let xref = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for off in offsets {
        pdf.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref
        )
        .as_bytes(),
    );
    pdf
}

fn write_pdf(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, minimal_pdf(lines)).unwrap();
    p
}

fn config(dir: &Path) -> ConversionConfig {
    ConversionConfig::builder()
        .output_dir(dir.join("out"))
        .build()
        .unwrap()
}

/// Skip unless E2E_ENABLED is set and the required tools are installed.
macro_rules! e2e_skip_unless_ready {
    ($config:expr, $format:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let report: ToolReport = check_tools(&$config, $format);
        if let Some(w) = report.warning() {
            println!("SKIP — {w}");
            return;
        }
        report
    }};
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn test_real_docx() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let _report = e2e_skip_unless_ready!(config, TargetFormat::Docx);

    let pdf = write_pdf(dir.path(), "report.pdf", &["Quarterly report", "Revenue grew."]);
    let request = ConversionRequest::new(&pdf, TargetFormat::Docx).unwrap();
    let result = convert(&request, &config);

    println!("{}", serde_json::to_string_pretty(&result).unwrap());
    assert!(result.succeeded, "{}", result.message);
    let out = result.output_path.unwrap();
    assert_eq!(out, dir.path().join("out").join("report.docx"));
    // DOCX is a zip archive.
    assert_eq!(&std::fs::read(&out).unwrap()[..2], b"PK");
}

#[test]
fn test_real_odt() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let _report = e2e_skip_unless_ready!(config, TargetFormat::Odt);

    let pdf = write_pdf(dir.path(), "notes.pdf", &["Meeting notes", "(draft)"]);
    let request = ConversionRequest::new(&pdf, TargetFormat::Odt).unwrap();
    let result = convert(&request, &config);

    assert!(result.succeeded, "{}", result.message);
    assert!(std::fs::metadata(result.output_path.unwrap()).unwrap().len() > 0);
}

#[test]
fn test_real_doc_or_substitution() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let _report = e2e_skip_unless_ready!(config, TargetFormat::Doc);

    let pdf = write_pdf(dir.path(), "scan.pdf", &["Scanned letter"]);
    let request = ConversionRequest::new(&pdf, TargetFormat::Doc).unwrap();
    let result = convert(&request, &config);

    assert!(result.succeeded, "{}", result.message);
    let out = result.output_path.clone().unwrap();
    match result.substitution {
        Some(_) => {
            assert_eq!(out.extension().unwrap(), "docx");
            assert!(!dir.path().join("out").join("scan.doc").exists());
        }
        None => assert_eq!(out.extension().unwrap(), "doc"),
    }
    assert!(out.exists());
}

#[test]
fn test_real_blank_pdf_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let _report = e2e_skip_unless_ready!(config, TargetFormat::Docx);

    let pdf = write_pdf(dir.path(), "empty.pdf", &[]);
    let request = ConversionRequest::new(&pdf, TargetFormat::Docx).unwrap();
    let result = convert(&request, &config);

    assert!(!result.succeeded);
    assert_eq!(result.attempts.len(), 3);
    assert!(!result.message.is_empty());
}

#[test]
fn test_minimal_pdf_has_magic() {
    // Runs without E2E_ENABLED: guards the fixture builder itself.
    let pdf = minimal_pdf(&["x"]);
    assert!(pdf.starts_with(b"%PDF"));
    assert!(pdf.ends_with(b"%%EOF\n"));
}
