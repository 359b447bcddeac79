//! Upfront gate run before any expensive document work.
//!
//! Validation is deterministic and cheap: one metadata stat plus a four byte read.
//! Failures are reported as data, not errors, so the caller can display the message
//! directly and simply decline to run the rest of the pipeline.

use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Maximum accepted document size in megabytes unless overridden.
pub const DEFAULT_MAX_PDF_SIZE_MB: u64 = 10;

/// Magic bytes every well-formed PDF starts with.
const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Outcome of validating an uploaded document.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// Whether the file may proceed into the pipeline.
    pub valid: bool,
    /// Human-readable verdict suitable for direct display.
    pub message: String,
}

impl ValidationResult {
    fn reject(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Validate a PDF against the default size limit.
pub fn validate_pdf(path: &Path) -> ValidationResult {
    validate_pdf_with_limit(path, DEFAULT_MAX_PDF_SIZE_MB)
}

/// Validate a PDF with an explicit size limit in megabytes.
///
/// Checks run in strict order and short-circuit on the first failure: existence,
/// `.pdf` extension (case-insensitive), `%PDF` magic bytes, size cap. Files shorter
/// than four bytes fail the header check.
pub fn validate_pdf_with_limit(path: &Path, max_size_mb: u64) -> ValidationResult {
    let Ok(metadata) = std::fs::metadata(path) else {
        return ValidationResult::reject("File not found.");
    };

    let has_pdf_extension = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !has_pdf_extension {
        return ValidationResult::reject("File must have a .pdf extension.");
    }

    if !header_matches(path) {
        return ValidationResult::reject("File is not a valid PDF (invalid header).");
    }

    let size_mb = metadata.len() as f64 / (1024.0 * 1024.0);
    if size_mb > max_size_mb as f64 {
        return ValidationResult::reject(format!(
            "File size ({size_mb:.1}MB) exceeds {max_size_mb}MB limit."
        ));
    }

    ValidationResult {
        valid: true,
        message: format!("Valid PDF ({size_mb:.2} MB)"),
    }
}

fn header_matches(path: &Path) -> bool {
    let mut header = [0_u8; 4];
    match File::open(path) {
        Ok(mut file) => file.read_exact(&mut header).is_ok() && &header == PDF_MAGIC,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let unique = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "docqa-validate-{}-{unique}-{name}",
            std::process::id()
        ));
        std::fs::write(&path, contents).expect("write temp file");
        path
    }

    #[test]
    fn missing_file_is_rejected() {
        let result = validate_pdf(Path::new("/nonexistent/doc.pdf"));
        assert!(!result.valid);
        assert_eq!(result.message, "File not found.");
    }

    #[test]
    fn wrong_extension_is_rejected() {
        let path = temp_file("notes.txt", b"%PDF-1.4");
        let result = validate_pdf(&path);
        assert!(!result.valid);
        assert_eq!(result.message, "File must have a .pdf extension.");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn bad_header_is_rejected_regardless_of_extension() {
        let path = temp_file("fake.pdf", b"GIF89a not a pdf at all");
        let result = validate_pdf(&path);
        assert!(!result.valid);
        assert_eq!(result.message, "File is not a valid PDF (invalid header).");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn empty_existing_file_fails_the_header_check() {
        let path = temp_file("empty.pdf", b"");
        let result = validate_pdf(&path);
        assert!(!result.valid);
        assert_eq!(result.message, "File is not a valid PDF (invalid header).");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn uppercase_extension_is_accepted() {
        let path = temp_file("REPORT.PDF", b"%PDF-1.7\nsome body");
        let result = validate_pdf(&path);
        assert!(result.valid, "{}", result.message);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn valid_small_file_reports_size_with_two_decimals() {
        let path = temp_file("ok.pdf", b"%PDF-1.4\n1 0 obj\nendobj");
        let result = validate_pdf(&path);
        assert!(result.valid);
        assert_eq!(result.message, "Valid PDF (0.00 MB)");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn oversized_file_is_rejected_with_one_decimal_size() {
        let path = temp_file("big.pdf", b"%PDF-1.4 plus a body");
        let result = validate_pdf_with_limit(&path, 0);
        assert!(!result.valid);
        assert_eq!(result.message, "File size (0.0MB) exceeds 0MB limit.");
        std::fs::remove_file(path).ok();
    }
}
