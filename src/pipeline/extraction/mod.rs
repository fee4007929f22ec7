pub mod types;
pub mod sanitize;
pub mod text_only;
pub mod pdf;
pub mod docx;
pub mod preprocess;
pub mod ocr;
pub mod orchestrator;

pub use types::*;
pub use sanitize::*;
pub use text_only::*;
pub use pdf::*;
pub use docx::*;
pub use ocr::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tesseract OCR initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("DOCX parsing failed: {0}")]
    DocxParsing(String),

    #[error("Text encoding error: {0}")]
    EncodingError(String),

    #[error("Unsupported format for extraction")]
    UnsupportedFormat,
}

impl ExtractionError {
    /// Stable, human-readable cause string surfaced to callers.
    pub fn cause(&self) -> &'static str {
        match self {
            Self::Io(_) => "io-failed",
            Self::OcrInit(_) | Self::OcrProcessing(_) | Self::ImageProcessing(_) => "ocr-failed",
            Self::PdfParsing(_) => "pdf-parse-failed",
            Self::DocxParsing(_) => "docx-parse-failed",
            Self::EncodingError(_) => "encoding-failed",
            Self::UnsupportedFormat => "unsupported-format",
        }
    }
}
