use serde::{Deserialize, Serialize};

use super::ExtractionError;
use crate::pipeline::import::FormatKind;

/// Characters shown in an extracted-text preview.
pub const PREVIEW_CHARS: usize = 200;

/// Plain text recovered from a single uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    pub format: FormatKind,
    pub method: ExtractionMethod,
    pub text: String,
    pub char_count: usize,
}

impl ExtractedText {
    pub fn new(format: FormatKind, method: ExtractionMethod, text: String) -> Self {
        let char_count = text.chars().count();
        Self {
            format,
            method,
            text,
            char_count,
        }
    }

    /// First `PREVIEW_CHARS` characters, with an ellipsis when truncated.
    /// Display lifecycle of the preview belongs to the caller.
    pub fn preview(&self) -> String {
        if self.char_count > PREVIEW_CHARS {
            let head: String = self.text.chars().take(PREVIEW_CHARS).collect();
            format!("{head}...")
        } else {
            self.text.clone()
        }
    }
}

/// How text was extracted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExtractionMethod {
    PlainTextRead,
    PdfDirect,
    DocxXml,
    TesseractOcr,
}

/// Raw OCR result from the engine
#[derive(Debug)]
pub struct OcrPageResult {
    pub text: String,
    pub confidence: f32,
}

/// Progress reported by an OCR engine while it works.
#[derive(Debug, Clone, PartialEq)]
pub enum OcrProgress {
    Initializing { language: String },
    LoadingImage { bytes: usize },
    Recognizing,
    Completed { confidence: f32 },
}

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine {
    /// Recognize text in `image_bytes`, reporting progress through `on_progress`.
    fn recognize(
        &self,
        image_bytes: &[u8],
        lang: &str,
        on_progress: &mut dyn FnMut(OcrProgress),
    ) -> Result<OcrPageResult, ExtractionError>;
}

/// PDF text-layer decoder abstraction
pub trait PdfExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// OOXML (DOCX) text decoder abstraction
pub trait DocxExtractor {
    fn extract_text(&self, docx_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Converts raw document bytes of a known format into plain text.
pub trait TextExtractor {
    fn extract(&self, format: FormatKind, bytes: &[u8]) -> Result<ExtractedText, ExtractionError>;
}
