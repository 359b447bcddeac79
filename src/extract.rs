//! Text extraction with a two-pass strategy.
//!
//! The primary pass walks the document page by page with `lopdf`, which is cheap and
//! covers most digitally produced PDFs. Some encoders embed text in ways the simple
//! pass cannot recover, so when it yields almost nothing the document is re-read with
//! `pdf-extract`, which interprets content streams and font encodings in full. A fatal
//! failure of the fallback pass surfaces as a tagged error rather than error prose in
//! the returned text, so downstream stages can never mistake a failure for content.

use std::path::Path;
use thiserror::Error;

/// Primary results shorter than this are discarded in favor of the fallback pass.
pub const MIN_PRIMARY_TEXT_CHARS: usize = 100;

/// Errors raised when no extraction pass could read the document.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Both passes failed to produce text from the document.
    #[error("Error extracting text: {0}")]
    Unreadable(String),
}

/// Extract raw text from a PDF, page texts joined by newlines and trimmed.
///
/// The returned string may be empty when the document parses but carries no text
/// layer (scanned documents); callers apply their own minimum-length heuristic
/// before doing further work.
pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let primary = extract_primary(path);
    if !needs_fallback(&primary) {
        return Ok(primary.trim().to_string());
    }

    tracing::debug!(
        path = %path.display(),
        primary_chars = primary.trim().chars().count(),
        "Primary extraction yielded too little text; running fallback"
    );

    let fallback = pdf_extract::extract_text(path)
        .map_err(|error| ExtractError::Unreadable(error.to_string()))?;
    Ok(fallback.trim().to_string())
}

/// Best-effort page-by-page pass; failing pages are skipped, a failing load yields
/// an empty string so the fallback pass takes over.
fn extract_primary(path: &Path) -> String {
    let document = match lopdf::Document::load(path) {
        Ok(document) => document,
        Err(error) => {
            tracing::debug!(path = %path.display(), %error, "Primary PDF load failed");
            return String::new();
        }
    };

    let mut text = String::new();
    for (page_number, _) in document.get_pages() {
        match document.extract_text(&[page_number]) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Ok(_) => {}
            Err(error) => {
                tracing::debug!(page = page_number, %error, "Skipping unreadable page");
            }
        }
    }
    text
}

/// Whether a primary pass result is too short to trust.
fn needs_fallback(primary: &str) -> bool {
    primary.trim().chars().count() < MIN_PRIMARY_TEXT_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use std::path::PathBuf;

    fn write_pdf(name: &str, lines: &[&str]) -> PathBuf {
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

        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![50.into(), 700.into()]),
        ];
        for line in lines {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("Td", vec![0.into(), (-30).into()]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let path = std::env::temp_dir().join(format!("docqa-extract-{}-{name}", std::process::id()));
        doc.save(&path).expect("save generated pdf");
        path
    }

    #[test]
    fn primary_pass_reads_generated_document() {
        let path = write_pdf("hello.pdf", &["Hello World from the primary pass"]);
        let text = extract_primary(&path);
        assert!(text.contains("Hello World"), "got: {text:?}");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn unreadable_file_yields_tagged_error() {
        let path = std::env::temp_dir().join(format!("docqa-extract-garbage-{}.pdf", std::process::id()));
        std::fs::write(&path, b"%PDF-1.4 but nothing else that parses").expect("write");
        let result = extract_text(&path);
        assert!(matches!(result, Err(ExtractError::Unreadable(_))));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn fallback_trigger_uses_trimmed_length() {
        assert!(needs_fallback(""));
        assert!(needs_fallback("   \n  short  \n"));
        assert!(!needs_fallback(&"x".repeat(MIN_PRIMARY_TEXT_CHARS)));
    }
}
