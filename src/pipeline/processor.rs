//! Caller-facing analysis pipeline.
//!
//! One entry point drives classify → extract → infer. Extraction failures
//! are the only errors a caller sees; every inference failure is absorbed
//! by the cascade, which always yields a record.
//!
//! Engines are injected as trait objects so the whole pipeline runs
//! against mocks in tests.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::config::InferenceConfig;
use crate::models::{PrescriptionRecord, TierSource};
use crate::pipeline::extraction::orchestrator::DocumentExtractor;
use crate::pipeline::extraction::types::{ExtractedText, ExtractionMethod, TextExtractor};
use crate::pipeline::extraction::ExtractionError;
use crate::pipeline::import::{classify, guess_mime_type, FormatKind};
use crate::pipeline::structuring::cascade::InferenceCascade;
use crate::pipeline::structuring::huggingface::HuggingFaceClient;
use crate::pipeline::structuring::StructuringError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors surfaced to callers of the analyzer.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Unsupported format: '{file_name}' ({mime_type})")]
    UnsupportedFormat { mime_type: String, file_name: String },

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Cannot read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Inference client setup failed: {0}")]
    ClientSetup(#[from] StructuringError),

    #[error("Analysis task aborted: {0}")]
    Task(String),
}

impl AnalysisError {
    /// Stable cause string, in the same vocabulary as [`ExtractionError::cause`].
    pub fn cause(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "unsupported-format",
            Self::Extraction(e) => e.cause(),
            Self::Io(_) => "io-failed",
            Self::ClientSetup(_) => "client-setup-failed",
            Self::Task(_) => "task-aborted",
        }
    }
}

// ---------------------------------------------------------------------------
// Input and result types
// ---------------------------------------------------------------------------

/// What the user submitted: an uploaded file or pasted text.
#[derive(Debug, Clone)]
pub enum AnalysisInput {
    File {
        bytes: Vec<u8>,
        mime_type: String,
        file_name: String,
    },
    Text(String),
}

impl AnalysisInput {
    /// Read a file from disk, guessing its declared type from the name.
    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let mime_type = guess_mime_type(path);
        Ok(Self::File {
            bytes,
            mime_type,
            file_name,
        })
    }
}

/// Extraction stage summary. Plain values only; what to display and for
/// how long is up to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionSummary {
    pub format: FormatKind,
    pub method: ExtractionMethod,
    pub char_count: usize,
    pub preview: String,
}

impl From<&ExtractedText> for ExtractionSummary {
    fn from(extracted: &ExtractedText) -> Self {
        Self {
            format: extracted.format,
            method: extracted.method,
            char_count: extracted.char_count,
            preview: extracted.preview(),
        }
    }
}

/// Result of one analysis: the record plus where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub record: PrescriptionRecord,
    pub source: TierSource,
    /// True when the record did not come from the primary model.
    pub degraded: bool,
    /// Present only for file input.
    pub extraction: Option<ExtractionSummary>,
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Drives a single prescription through extraction and the inference cascade.
pub struct PrescriptionAnalyzer {
    extractor: Box<dyn TextExtractor + Send + Sync>,
    cascade: InferenceCascade,
}

impl PrescriptionAnalyzer {
    pub fn new(extractor: Box<dyn TextExtractor + Send + Sync>, cascade: InferenceCascade) -> Self {
        Self { extractor, cascade }
    }

    /// Blocking: OCR and both model calls may each take seconds.
    /// The per-call id only tags log lines; the outcome depends on the
    /// input alone.
    pub fn analyze(&self, input: AnalysisInput) -> Result<AnalysisOutcome, AnalysisError> {
        let analysis_id = Uuid::new_v4();
        let _span = tracing::info_span!("analyze", analysis_id = %analysis_id).entered();

        let (text, extraction) = match input {
            AnalysisInput::Text(text) => {
                tracing::info!(chars = text.chars().count(), "Analyzing pasted text");
                (text, None)
            }
            AnalysisInput::File {
                bytes,
                mime_type,
                file_name,
            } => {
                let format = classify(&mime_type, &file_name);
                tracing::info!(
                    format = format.as_str(),
                    mime_type = %mime_type,
                    size = bytes.len(),
                    "Analyzing uploaded file"
                );
                if !format.is_supported() {
                    return Err(AnalysisError::UnsupportedFormat {
                        mime_type,
                        file_name,
                    });
                }
                // `bytes` is dropped at the end of this arm, before inference
                let extracted = self.extractor.extract(format, &bytes)?;
                let summary = ExtractionSummary::from(&extracted);
                (extracted.text, Some(summary))
            }
        };

        let outcome = self.cascade.infer(&text);
        let degraded = outcome.degraded();

        tracing::info!(
            source = outcome.source.as_str(),
            degraded,
            medications = outcome.record.medications.len(),
            "Analysis complete"
        );

        Ok(AnalysisOutcome {
            record: outcome.record,
            source: outcome.source,
            degraded,
            extraction,
        })
    }

    /// Run [`analyze`](Self::analyze) on the blocking pool so async callers
    /// can await it without stalling their runtime.
    pub async fn analyze_async(
        self: Arc<Self>,
        input: AnalysisInput,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        tokio::task::spawn_blocking(move || self.analyze(input))
            .await
            .map_err(|e| AnalysisError::Task(e.to_string()))?
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Build a `PrescriptionAnalyzer` with production implementations.
///
/// - Extraction: pdf-extract, zip + quick-xml, Tesseract when built with `ocr`
/// - Inference: `HuggingFaceClient` → primary model → fallback model → heuristics
///
/// Must not be called from inside an async context: the blocking HTTP
/// client owns its own runtime.
pub fn build_analyzer(config: &InferenceConfig) -> Result<PrescriptionAnalyzer, AnalysisError> {
    let extractor = Box::new(DocumentExtractor::with_defaults());

    let client = Arc::new(HuggingFaceClient::from_config(config)?);
    tracing::info!(
        base_url = %config.base_url,
        primary = %config.primary.model_id,
        fallback = %config.fallback.model_id,
        authenticated = config.api_token.is_some(),
        "Prescription analyzer configured"
    );

    Ok(PrescriptionAnalyzer::new(
        extractor,
        InferenceCascade::from_client(client, config),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelSettings;
    use crate::models::UNABLE_TO_EXTRACT;
    use crate::pipeline::extraction::docx::DocxTextExtractor;
    use crate::pipeline::extraction::ocr::MockOcrEngine;
    use crate::pipeline::extraction::pdf::PdfTextExtractor;
    use crate::pipeline::structuring::huggingface::MockInferenceClient;
    use std::io::Write;

    const SCENARIO: &str = "Patient: John Doe, 45 years old Diagnosis: Bacterial infection \
                            Medications: 1. Amoxicillin 500mg three times daily";

    fn analyzer(client: MockInferenceClient) -> PrescriptionAnalyzer {
        let config = InferenceConfig {
            primary: ModelSettings::primary("primary"),
            fallback: ModelSettings::fallback("fallback"),
            ..InferenceConfig::default()
        };
        let extractor = DocumentExtractor::new(
            Box::new(MockOcrEngine::new("Patient: Ana Silva\nIbuprofen 200mg", 0.9)),
            Box::new(PdfTextExtractor),
            Box::new(DocxTextExtractor),
        );
        PrescriptionAnalyzer::new(
            Box::new(extractor),
            InferenceCascade::from_client(Arc::new(client), &config),
        )
    }

    fn offline() -> MockInferenceClient {
        MockInferenceClient::new()
            .fail("primary", 503)
            .fail("fallback", 503)
    }

    #[test]
    fn text_input_with_services_down_is_degraded_heuristic() {
        let outcome = analyzer(offline())
            .analyze(AnalysisInput::Text(SCENARIO.into()))
            .unwrap();
        assert_eq!(outcome.source, TierSource::Heuristic);
        assert!(outcome.degraded);
        assert!(outcome.extraction.is_none());
        assert_eq!(outcome.record.patient_name, "John Doe");
    }

    #[test]
    fn primary_model_result_is_not_degraded() {
        let client = MockInferenceClient::new()
            .respond("primary", r#"{"patientName":"John Doe","age":"45 years old"}"#);
        let outcome = analyzer(client)
            .analyze(AnalysisInput::Text(SCENARIO.into()))
            .unwrap();
        assert_eq!(outcome.source, TierSource::PrimaryModel);
        assert!(!outcome.degraded);
        assert_eq!(outcome.record.diagnosis, vec![UNABLE_TO_EXTRACT]);
    }

    #[test]
    fn text_file_is_classified_and_extracted() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(SCENARIO.as_bytes()).unwrap();

        let input = AnalysisInput::from_path(file.path()).unwrap();
        let outcome = analyzer(offline()).analyze(input).unwrap();

        let extraction = outcome.extraction.unwrap();
        assert_eq!(extraction.format, FormatKind::PlainText);
        assert_eq!(extraction.method, ExtractionMethod::PlainTextRead);
        assert_eq!(extraction.char_count, SCENARIO.chars().count());
        assert_eq!(outcome.record.medication_names(), vec!["Amoxicillin"]);
    }

    #[test]
    fn image_upload_goes_through_ocr() {
        let img = image::DynamicImage::ImageRgb8(image::ImageBuffer::from_pixel(
            8,
            8,
            image::Rgb([0u8, 0, 0]),
        ));
        let mut png = std::io::Cursor::new(Vec::new());
        img.write_to(&mut png, image::ImageOutputFormat::Png).unwrap();

        let outcome = analyzer(offline())
            .analyze(AnalysisInput::File {
                bytes: png.into_inner(),
                mime_type: "image/png".into(),
                file_name: "scan.png".into(),
            })
            .unwrap();
        assert_eq!(
            outcome.extraction.map(|e| e.method),
            Some(ExtractionMethod::TesseractOcr)
        );
        assert_eq!(outcome.record.patient_name, "Ana Silva");
    }

    #[test]
    fn unsupported_file_is_rejected_with_its_type() {
        let err = analyzer(offline())
            .analyze(AnalysisInput::File {
                bytes: vec![0, 1, 2],
                mime_type: "application/zip".into(),
                file_name: "records.zip".into(),
            })
            .unwrap_err();
        assert_eq!(err.cause(), "unsupported-format");
        match err {
            AnalysisError::UnsupportedFormat {
                mime_type,
                file_name,
            } => {
                assert_eq!(mime_type, "application/zip");
                assert_eq!(file_name, "records.zip");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn corrupt_docx_surfaces_extraction_error() {
        let err = analyzer(offline())
            .analyze(AnalysisInput::File {
                bytes: b"not a zip archive".to_vec(),
                mime_type: crate::pipeline::import::DOCX_MIME.into(),
                file_name: "rx.docx".into(),
            })
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Extraction(_)));
        assert_eq!(err.cause(), "docx-parse-failed");
    }

    #[test]
    fn invalid_utf8_text_file_is_encoding_failure() {
        let err = analyzer(offline())
            .analyze(AnalysisInput::File {
                bytes: vec![0xff, 0xfe, 0xfd],
                mime_type: "text/plain".into(),
                file_name: "rx.txt".into(),
            })
            .unwrap_err();
        assert_eq!(err.cause(), "encoding-failed");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AnalysisInput::from_path(Path::new("/nonexistent/rx.txt")).unwrap_err();
        assert_eq!(err.cause(), "io-failed");
    }

    #[tokio::test]
    async fn async_entry_point_matches_blocking_result() {
        let analyzer = Arc::new(analyzer(offline()));
        let outcome = analyzer
            .clone()
            .analyze_async(AnalysisInput::Text(SCENARIO.into()))
            .await
            .unwrap();
        assert_eq!(outcome.source, TierSource::Heuristic);
        assert_eq!(outcome.record.age, "45 years old");
    }

    #[test]
    fn identical_inputs_serialize_identically() {
        let analyzer = analyzer(offline());
        let a = analyzer.analyze(AnalysisInput::Text(SCENARIO.into())).unwrap();
        let b = analyzer.analyze(AnalysisInput::Text(SCENARIO.into())).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
