use std::panic::{self, AssertUnwindSafe};

use super::types::PdfExtractor;
use super::ExtractionError;

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers; scanned PDFs without
/// one are reported as failures rather than silently yielding nothing.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        // pdf-extract panics on some malformed inputs instead of erroring
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(pdf_bytes)
        }));

        let text = match outcome {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(ExtractionError::PdfParsing(e.to_string())),
            Err(_) => {
                return Err(ExtractionError::PdfParsing(
                    "decoder aborted on malformed PDF".into(),
                ))
            }
        };

        if text.trim().is_empty() {
            return Err(ExtractionError::PdfParsing(
                "PDF has no extractable text layer".into(),
            ));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generate a valid PDF with text using lopdf (the library that pdf-extract uses internally).
    fn make_test_pdf(text: Option<&str>) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let content = match text {
            Some(text) => format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET"),
            None => String::new(),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });

        if let Ok(Object::Dictionary(ref mut dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", pages_id);
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn extract_text_from_digital_pdf() {
        let pdf = make_test_pdf(Some("Amoxicillin 500mg three times daily"));
        let text = PdfTextExtractor.extract_text(&pdf).unwrap();
        assert!(
            text.contains("Amoxicillin") || text.contains("500mg"),
            "Expected prescription text, got: {text}"
        );
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let err = PdfTextExtractor.extract_text(b"not a pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::PdfParsing(_)));
        assert_eq!(err.cause(), "pdf-parse-failed");
    }

    #[test]
    fn pdf_without_text_layer_is_error() {
        let pdf = make_test_pdf(None);
        let err = PdfTextExtractor.extract_text(&pdf).unwrap_err();
        assert_eq!(err.cause(), "pdf-parse-failed");
    }
}
