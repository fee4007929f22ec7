use serde::Serialize;

use super::StructuringError;
use crate::config::ModelSettings;
use crate::models::{PrescriptionRecord, TierSource};

/// Text-generation service abstraction (allows mocking for tests).
pub trait InferenceClient {
    /// Send `prompt` to the model named in `settings` and return the
    /// generated continuation.
    fn generate(&self, settings: &ModelSettings, prompt: &str) -> Result<String, StructuringError>;
}

/// One stage of the inference cascade. A tier first produces raw output
/// for the text, then interprets it; either step failing moves the cascade
/// on to the next tier.
pub trait InferenceTier {
    fn source(&self) -> TierSource;

    fn generate(&self, text: &str) -> Result<String, StructuringError>;

    fn interpret(&self, raw_output: &str) -> Result<PrescriptionRecord, StructuringError>;
}

/// Record of one tier's try. Lives only for the duration of a cascade run.
#[derive(Debug, Clone)]
pub struct ExtractionAttempt {
    pub source: TierSource,
    pub raw_output: String,
    pub succeeded: bool,
}

/// What the cascade hands back: the record plus which tier produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CascadeOutcome {
    pub record: PrescriptionRecord,
    pub source: TierSource,
}

impl CascadeOutcome {
    pub fn degraded(&self) -> bool {
        self.source.is_degraded()
    }
}
