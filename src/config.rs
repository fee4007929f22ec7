use std::path::PathBuf;

use serde::Serialize;

/// Application-level constants
pub const APP_NAME: &str = "Prescripta";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hugging Face serverless inference, the service the cascade was built against.
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_PRIMARY_MODEL: &str = "ibm-granite/granite-3.1-3b-a800m-instruct";
pub const DEFAULT_FALLBACK_MODEL: &str = "microsoft/DialoGPT-medium";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Tesseract language model used for scanned prescriptions.
pub const OCR_LANGUAGE: &str = "eng";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "prescripta=debug,prescripta_lib=debug,info"
    } else {
        "prescripta=info,prescripta_lib=info,warn"
    }
}

/// Sampling parameters for one inference tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSettings {
    pub model_id: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub do_sample: bool,
}

impl ModelSettings {
    /// Large output budget, near-deterministic sampling.
    pub fn primary(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            max_new_tokens: 2048,
            temperature: 0.1,
            top_p: 0.9,
            do_sample: true,
        }
    }

    /// Weaker model: smaller budget, wider sampling.
    pub fn fallback(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            max_new_tokens: 1024,
            temperature: 0.7,
            top_p: 0.9,
            do_sample: true,
        }
    }
}

/// Everything the inference cascade needs to reach its model services.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceConfig {
    pub base_url: String,
    /// Never serialized, so configs can be logged or dumped safely.
    #[serde(skip)]
    pub api_token: Option<String>,
    pub timeout_secs: u64,
    pub primary: ModelSettings,
    pub fallback: ModelSettings,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_INFERENCE_URL.to_string(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            primary: ModelSettings::primary(DEFAULT_PRIMARY_MODEL),
            fallback: ModelSettings::fallback(DEFAULT_FALLBACK_MODEL),
        }
    }
}

impl InferenceConfig {
    /// Build from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests inject a map here).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let timeout_secs = match non_empty("PRESCRIPTA_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid PRESCRIPTA_TIMEOUT_SECS, using default");
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            base_url: non_empty("PRESCRIPTA_INFERENCE_URL").unwrap_or(defaults.base_url),
            api_token: non_empty("PRESCRIPTA_API_TOKEN").or_else(|| non_empty("HF_API_TOKEN")),
            timeout_secs,
            primary: non_empty("PRESCRIPTA_PRIMARY_MODEL")
                .map(|m| ModelSettings::primary(&m))
                .unwrap_or(defaults.primary),
            fallback: non_empty("PRESCRIPTA_FALLBACK_MODEL")
                .map(|m| ModelSettings::fallback(&m))
                .unwrap_or(defaults.fallback),
        }
    }
}

/// Locate a tessdata directory holding the English model.
/// `TESSDATA_PREFIX` wins, then common system install paths.
pub fn find_tessdata_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("TESSDATA_PREFIX") {
        let p = PathBuf::from(&path);
        if p.join(format!("{OCR_LANGUAGE}.traineddata")).exists() {
            return Some(p);
        }
    }

    let candidates = [
        "/usr/share/tesseract-ocr/5/tessdata",
        "/usr/share/tesseract-ocr/4.00/tessdata",
        "/usr/share/tessdata",
        "/usr/local/share/tessdata",
        "/opt/homebrew/share/tessdata",
    ];

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.join(format!("{OCR_LANGUAGE}.traineddata")).exists())
}
