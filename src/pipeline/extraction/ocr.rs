use super::types::{OcrEngine, OcrPageResult, OcrProgress};
use super::ExtractionError;

/// Bundled Tesseract OCR engine.
/// Only available when compiled with the `ocr` feature flag.
#[cfg(feature = "ocr")]
pub struct BundledTesseract {
    tessdata_dir: std::path::PathBuf,
}

#[cfg(feature = "ocr")]
impl BundledTesseract {
    /// Initialize with a tessdata directory that holds at least `eng.traineddata`.
    pub fn new(tessdata_dir: &std::path::Path) -> Result<Self, ExtractionError> {
        if !tessdata_dir.join("eng.traineddata").exists() {
            return Err(ExtractionError::OcrInit(format!(
                "eng.traineddata not found in {}",
                tessdata_dir.display()
            )));
        }
        Ok(Self {
            tessdata_dir: tessdata_dir.to_path_buf(),
        })
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for BundledTesseract {
    fn recognize(
        &self,
        image_bytes: &[u8],
        lang: &str,
        on_progress: &mut dyn FnMut(OcrProgress),
    ) -> Result<OcrPageResult, ExtractionError> {
        let tessdata_str = self
            .tessdata_dir
            .to_str()
            .ok_or_else(|| ExtractionError::OcrInit("Invalid tessdata path".into()))?;

        on_progress(OcrProgress::Initializing {
            language: lang.to_string(),
        });
        let tess = tesseract::Tesseract::new(Some(tessdata_str), Some(lang))
            .map_err(|e| ExtractionError::OcrInit(format!("{e:?}")))?;

        on_progress(OcrProgress::LoadingImage {
            bytes: image_bytes.len(),
        });
        let mut tess = tess
            .set_image_from_mem(image_bytes)
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        on_progress(OcrProgress::Recognizing);
        let text = tess
            .get_text()
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        let confidence = tess.mean_text_conf().max(0) as f32 / 100.0;
        on_progress(OcrProgress::Completed { confidence });

        Ok(OcrPageResult { text, confidence })
    }
}

/// Stand-in used when no Tesseract installation is available: every
/// recognition attempt fails with an initialization error.
pub struct UnavailableOcrEngine {
    reason: String,
}

impl UnavailableOcrEngine {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

impl OcrEngine for UnavailableOcrEngine {
    fn recognize(
        &self,
        _image_bytes: &[u8],
        _lang: &str,
        _on_progress: &mut dyn FnMut(OcrProgress),
    ) -> Result<OcrPageResult, ExtractionError> {
        Err(ExtractionError::OcrInit(self.reason.clone()))
    }
}

/// Mock OCR engine for unit testing without Tesseract.
pub struct MockOcrEngine {
    pub text: String,
    pub confidence: f32,
}

impl MockOcrEngine {
    pub fn new(text: &str, confidence: f32) -> Self {
        Self {
            text: text.to_string(),
            confidence,
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(
        &self,
        image_bytes: &[u8],
        lang: &str,
        on_progress: &mut dyn FnMut(OcrProgress),
    ) -> Result<OcrPageResult, ExtractionError> {
        on_progress(OcrProgress::Initializing {
            language: lang.to_string(),
        });
        on_progress(OcrProgress::LoadingImage {
            bytes: image_bytes.len(),
        });
        on_progress(OcrProgress::Recognizing);
        on_progress(OcrProgress::Completed {
            confidence: self.confidence,
        });

        Ok(OcrPageResult {
            text: self.text.clone(),
            confidence: self.confidence,
        })
    }
}

/// Build the OCR engine, respecting feature flags.
pub fn build_ocr_engine() -> Box<dyn OcrEngine + Send + Sync> {
    #[cfg(feature = "ocr")]
    {
        if let Some(tessdata) = crate::config::find_tessdata_dir() {
            match BundledTesseract::new(&tessdata) {
                Ok(engine) => {
                    tracing::info!(tessdata = %tessdata.display(), "Tesseract OCR initialized");
                    return Box::new(engine);
                }
                Err(e) => tracing::warn!(error = %e, "Tesseract OCR unusable"),
            }
        } else {
            tracing::warn!("Tesseract data not found, images will not be OCR'd");
        }
        Box::new(UnavailableOcrEngine::new(
            "Tesseract data directory not found. Set TESSDATA_PREFIX or install tesseract-ocr-eng",
        ))
    }

    #[cfg(not(feature = "ocr"))]
    {
        tracing::info!("Built without the `ocr` feature, image OCR unavailable");
        Box::new(UnavailableOcrEngine::new(
            "this build has no OCR support (rebuild with --features ocr)",
        ))
    }
}
