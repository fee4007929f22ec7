use std::sync::Arc;

use super::heuristic::HeuristicExtractor;
use super::parser::parse_model_output;
use super::prompt::build_extraction_prompt;
use super::sanitize::sanitize_for_inference;
use super::types::{CascadeOutcome, ExtractionAttempt, InferenceClient, InferenceTier};
use super::StructuringError;
use crate::config::{InferenceConfig, ModelSettings};
use crate::models::{PrescriptionRecord, TierSource};

/// A hosted model reached through an [`InferenceClient`].
pub struct ModelTier {
    client: Arc<dyn InferenceClient + Send + Sync>,
    settings: ModelSettings,
    source: TierSource,
}

impl ModelTier {
    pub fn new(
        client: Arc<dyn InferenceClient + Send + Sync>,
        settings: ModelSettings,
        source: TierSource,
    ) -> Self {
        Self {
            client,
            settings,
            source,
        }
    }
}

impl InferenceTier for ModelTier {
    fn source(&self) -> TierSource {
        self.source
    }

    fn generate(&self, text: &str) -> Result<String, StructuringError> {
        let cleaned = sanitize_for_inference(text);
        if cleaned.trim().is_empty() {
            return Err(StructuringError::EmptyInput);
        }
        let prompt = build_extraction_prompt(&cleaned);
        self.client.generate(&self.settings, &prompt)
    }

    fn interpret(&self, raw_output: &str) -> Result<PrescriptionRecord, StructuringError> {
        parse_model_output(raw_output)
    }
}

/// Pattern rules over the original text. Its raw output is the text itself.
pub struct HeuristicTier {
    extractor: HeuristicExtractor,
}

impl HeuristicTier {
    pub fn new() -> Self {
        Self {
            extractor: HeuristicExtractor,
        }
    }
}

impl Default for HeuristicTier {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceTier for HeuristicTier {
    fn source(&self) -> TierSource {
        TierSource::Heuristic
    }

    fn generate(&self, text: &str) -> Result<String, StructuringError> {
        Ok(text.to_string())
    }

    fn interpret(&self, raw_output: &str) -> Result<PrescriptionRecord, StructuringError> {
        Ok(self.extractor.extract(raw_output))
    }
}

/// Tries each tier in order and returns the first usable record. Moving
/// to the next tier is immediate; there is no retry delay.
pub struct InferenceCascade {
    tiers: Vec<Box<dyn InferenceTier + Send + Sync>>,
    last_resort: HeuristicExtractor,
}

impl InferenceCascade {
    pub fn new(tiers: Vec<Box<dyn InferenceTier + Send + Sync>>) -> Self {
        Self {
            tiers,
            last_resort: HeuristicExtractor,
        }
    }

    /// Primary model, fallback model, then heuristic rules.
    pub fn from_client(
        client: Arc<dyn InferenceClient + Send + Sync>,
        config: &InferenceConfig,
    ) -> Self {
        Self::new(vec![
            Box::new(ModelTier::new(
                client.clone(),
                config.primary.clone(),
                TierSource::PrimaryModel,
            )),
            Box::new(ModelTier::new(
                client,
                config.fallback.clone(),
                TierSource::FallbackModel,
            )),
            Box::new(HeuristicTier::new()),
        ])
    }

    /// Never fails. When every configured tier fails, the heuristic
    /// extractor runs on the original text.
    pub fn infer(&self, text: &str) -> CascadeOutcome {
        let _span = tracing::info_span!("inference_cascade", chars = text.len()).entered();
        let mut attempts: Vec<ExtractionAttempt> = Vec::with_capacity(self.tiers.len());

        for tier in &self.tiers {
            let source = tier.source();
            let result = tier.generate(text).map(|raw| {
                let record = tier.interpret(&raw);
                (raw, record)
            });

            match result {
                Ok((raw_output, Ok(record))) => {
                    attempts.push(ExtractionAttempt {
                        source,
                        raw_output,
                        succeeded: true,
                    });
                    log_attempts(&attempts);
                    if source.is_degraded() {
                        tracing::warn!(tier = source.as_str(), "Using degraded extraction result");
                    }
                    return CascadeOutcome { record, source };
                }
                Ok((raw_output, Err(e))) => {
                    tracing::warn!(
                        tier = source.as_str(),
                        output_len = raw_output.len(),
                        error = %e,
                        "Tier output unusable, falling through"
                    );
                    attempts.push(ExtractionAttempt {
                        source,
                        raw_output,
                        succeeded: false,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        tier = source.as_str(),
                        status = ?e.status(),
                        error = %e,
                        "Tier call failed, falling through"
                    );
                    attempts.push(ExtractionAttempt {
                        source,
                        raw_output: String::new(),
                        succeeded: false,
                    });
                }
            }
        }

        log_attempts(&attempts);
        tracing::warn!("All configured tiers failed, using heuristic extraction");
        CascadeOutcome {
            record: self.last_resort.extract(text),
            source: TierSource::Heuristic,
        }
    }
}

fn log_attempts(attempts: &[ExtractionAttempt]) {
    for (i, attempt) in attempts.iter().enumerate() {
        tracing::debug!(
            order = i + 1,
            tier = attempt.source.as_str(),
            succeeded = attempt.succeeded,
            output_len = attempt.raw_output.len(),
            "Cascade attempt"
        );
    }
}
