//! PDF text extraction: pull the selectable text layer out of an uploaded quote.
//!
//! ## Best effort by contract
//!
//! Plenty of quotes arrive as phone scans with no text layer, and some PDF
//! producers write structures no parser handles. None of that is worth an
//! error page: the user can always paste the text. So [`extract_pdf_text`]
//! never fails. It returns a [`PdfExtraction`] and the caller decides, via
//! [`PdfExtraction::into_text`], that an unreadable file means "no text".
//!
//! ## Why spawn_blocking?
//!
//! `lopdf` parses synchronously and a hostile file can keep it busy for a
//! while. Running it on the blocking pool keeps the Tokio workers free, and
//! a panic inside the parser comes back as a `JoinError` instead of taking
//! the request down.

use crate::pipeline::postprocess::assemble_pages;
use lopdf::Document;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Result of a best-effort extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfExtraction {
    /// Cleaned text from at least one page.
    Text(String),
    /// Nothing usable came out of the file.
    Unreadable { reason: String },
}

impl PdfExtraction {
    /// Collapse to the plain-string form: failure becomes `""`.
    pub fn into_text(self) -> String {
        match self {
            PdfExtraction::Text(text) => text,
            PdfExtraction::Unreadable { .. } => String::new(),
        }
    }

    pub fn is_readable(&self) -> bool {
        matches!(self, PdfExtraction::Text(_))
    }
}

#[derive(Debug, Error)]
enum ExtractError {
    #[error("failed to parse PDF: {0}")]
    Parse(#[from] lopdf::Error),

    #[error("failed to extract text from page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: lopdf::Error,
    },

    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Extract the text of every page of the PDF at `pdf_path`.
///
/// Pages are read in document order, cleaned, and joined with a blank line.
/// Any failure, including a parser panic, yields [`PdfExtraction::Unreadable`].
pub async fn extract_pdf_text(pdf_path: &Path) -> PdfExtraction {
    let path = pdf_path.to_path_buf();

    let result = tokio::task::spawn_blocking(move || extract_pages_blocking(&path))
        .await
        .map_err(ExtractError::from)
        .and_then(|r| r);

    match result {
        Ok(pages) => {
            let text = assemble_pages(&pages);
            if text.is_empty() {
                info!(
                    "No selectable text in {} ({} pages)",
                    pdf_path.display(),
                    pages.len()
                );
                PdfExtraction::Unreadable {
                    reason: "no selectable text (scanned or image-only PDF?)".to_string(),
                }
            } else {
                info!(
                    "Extracted {} chars from {} pages of {}",
                    text.len(),
                    pages.len(),
                    pdf_path.display()
                );
                PdfExtraction::Text(text)
            }
        }
        Err(e) => {
            warn!("PDF extraction failed for {}: {}", pdf_path.display(), e);
            PdfExtraction::Unreadable {
                reason: e.to_string(),
            }
        }
    }
}

/// Blocking implementation: one raw string per page, in page order.
fn extract_pages_blocking(pdf_path: &Path) -> Result<Vec<String>, ExtractError> {
    let document = Document::load(pdf_path)?;
    let pages = document.get_pages();
    debug!("PDF loaded: {} pages", pages.len());

    // BTreeMap keys are the 1-based page numbers, already in order.
    pages
        .keys()
        .map(|&page| {
            document
                .extract_text(&[page])
                .map_err(|source| ExtractError::Page { page, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use std::path::PathBuf;

    /// Build a minimal PDF with one line of Courier text per page.
    fn text_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
            ];
            if !text.is_empty() {
                operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
            }
            operations.push(Operation::new("ET", vec![]));
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    fn write_tmp(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn into_text_maps_unreadable_to_empty() {
        let u = PdfExtraction::Unreadable {
            reason: "corrupt".into(),
        };
        assert!(!u.is_readable());
        assert_eq!(u.into_text(), "");
        assert_eq!(PdfExtraction::Text("hi".into()).into_text(), "hi");
    }

    #[tokio::test]
    async fn extracts_pages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(
            &dir,
            "quote.pdf",
            &text_pdf(&["Labour 4 hours", "Parts and GST"]),
        );

        let text = extract_pdf_text(&path).await.into_text();
        let labour = text.find("Labour 4 hours").expect("page one text");
        let parts = text.find("Parts and GST").expect("page two text");
        assert!(labour < parts, "pages out of order: {text:?}");
        assert!(!text.contains("\n\n\n"));
        assert_eq!(text, text.trim());
    }

    #[tokio::test]
    async fn textless_pdf_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "scan.pdf", &text_pdf(&["", ""]));

        let result = extract_pdf_text(&path).await;
        assert!(!result.is_readable(), "got: {result:?}");
    }

    #[tokio::test]
    async fn garbage_file_is_unreadable_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "broken.pdf", b"%PDF-1.4\nthis is not really a pdf");

        let result = extract_pdf_text(&path).await;
        assert!(matches!(result, PdfExtraction::Unreadable { .. }));
        assert_eq!(result.into_text(), "");
    }

    #[tokio::test]
    async fn missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_pdf_text(&dir.path().join("gone.pdf")).await;
        assert!(!result.is_readable());
    }
}
