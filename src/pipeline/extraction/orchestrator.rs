use super::docx::DocxTextExtractor;
use super::ocr::build_ocr_engine;
use super::pdf::PdfTextExtractor;
use super::preprocess::prepare_for_ocr;
use super::sanitize::{sanitize_extracted_text, strip_control_chars};
use super::text_only::decode_plain_text;
use super::types::{
    DocxExtractor, ExtractedText, ExtractionMethod, OcrEngine, OcrProgress, PdfExtractor,
    TextExtractor,
};
use super::ExtractionError;
use crate::config::OCR_LANGUAGE;
use crate::pipeline::import::FormatKind;

/// Concrete implementation of the text extractor.
/// Uses trait objects for OCR, PDF and DOCX decoding, enabling dependency injection.
pub struct DocumentExtractor {
    ocr_engine: Box<dyn OcrEngine + Send + Sync>,
    pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
    docx_extractor: Box<dyn DocxExtractor + Send + Sync>,
}

impl DocumentExtractor {
    pub fn new(
        ocr_engine: Box<dyn OcrEngine + Send + Sync>,
        pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
        docx_extractor: Box<dyn DocxExtractor + Send + Sync>,
    ) -> Self {
        Self {
            ocr_engine,
            pdf_extractor,
            docx_extractor,
        }
    }

    /// Production wiring: pdf-extract, zip/quick-xml and whatever OCR the build supports.
    pub fn with_defaults() -> Self {
        Self::new(
            build_ocr_engine(),
            Box::new(PdfTextExtractor),
            Box::new(DocxTextExtractor),
        )
    }

    fn recognize_image(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let prepared = prepare_for_ocr(bytes)?;
        let mut report = |progress: OcrProgress| match progress {
            OcrProgress::Initializing { language } => {
                tracing::debug!(language = %language, "OCR initializing");
            }
            OcrProgress::LoadingImage { bytes } => {
                tracing::debug!(bytes, "OCR loading image");
            }
            OcrProgress::Recognizing => tracing::debug!("OCR recognizing"),
            OcrProgress::Completed { confidence } => {
                tracing::debug!(confidence, "OCR completed");
            }
        };
        let result = self
            .ocr_engine
            .recognize(&prepared, OCR_LANGUAGE, &mut report)?;
        Ok(result.text)
    }
}

impl TextExtractor for DocumentExtractor {
    fn extract(&self, format: FormatKind, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        tracing::info!(
            format = format.as_str(),
            size = bytes.len(),
            "Starting text extraction"
        );

        let (method, text) = match format {
            FormatKind::PlainText => (
                ExtractionMethod::PlainTextRead,
                strip_control_chars(&decode_plain_text(bytes)?),
            ),
            FormatKind::Pdf => (
                ExtractionMethod::PdfDirect,
                sanitize_extracted_text(&self.pdf_extractor.extract_text(bytes)?),
            ),
            FormatKind::Docx => (
                ExtractionMethod::DocxXml,
                sanitize_extracted_text(&self.docx_extractor.extract_text(bytes)?),
            ),
            FormatKind::Image => (
                ExtractionMethod::TesseractOcr,
                sanitize_extracted_text(&self.recognize_image(bytes)?),
            ),
            FormatKind::Unsupported => return Err(ExtractionError::UnsupportedFormat),
        };

        let extracted = ExtractedText::new(format, method, text);

        tracing::info!(
            format = format.as_str(),
            method = ?extracted.method,
            chars = extracted.char_count,
            "Text extraction complete"
        );

        Ok(extracted)
    }
}
