use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::InferenceClient;
use super::StructuringError;
use crate::config::{InferenceConfig, ModelSettings};

/// Client for Hugging Face style text-generation endpoints
/// (`POST {base_url}/models/{model_id}`).
pub struct HuggingFaceClient {
    base_url: String,
    api_token: Option<String>,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HuggingFaceClient {
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, StructuringError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StructuringError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &InferenceConfig) -> Result<Self, StructuringError> {
        Self::new(&config.base_url, config.api_token.clone(), config.timeout_secs)
    }

    fn endpoint(&self, model_id: &str) -> String {
        format!("{}/models/{}", self.base_url, model_id)
    }
}

/// Request body for text generation
#[derive(Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    do_sample: bool,
}

impl From<&ModelSettings> for GenerateParameters {
    fn from(settings: &ModelSettings) -> Self {
        Self {
            max_new_tokens: settings.max_new_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
            do_sample: settings.do_sample,
        }
    }
}

/// One element of the `[ {generated_text}, ... ]` response array
#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

impl InferenceClient for HuggingFaceClient {
    fn generate(&self, settings: &ModelSettings, prompt: &str) -> Result<String, StructuringError> {
        let url = self.endpoint(&settings.model_id);
        let body = GenerateRequest {
            inputs: prompt,
            parameters: settings.into(),
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| {
            if e.is_connect() {
                StructuringError::ServiceConnection(self.base_url.clone())
            } else if e.is_timeout() {
                StructuringError::HttpClient(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                StructuringError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StructuringError::ServiceError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: Vec<GeneratedText> = response
            .json()
            .map_err(|e| StructuringError::ResponseParsing(e.to_string()))?;

        let generated = parsed
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| StructuringError::ResponseParsing("empty generation list".into()))?;

        Ok(strip_prompt_echo(prompt, generated))
    }
}

/// Text-generation endpoints return the prompt followed by the completion
/// unless told otherwise. The prompt carries its own JSON template, so it
/// has to go before the response is searched for a record.
fn strip_prompt_echo(prompt: &str, generated: String) -> String {
    match generated.strip_prefix(prompt) {
        Some(completion) => completion.to_string(),
        None => generated,
    }
}

/// Scripted outcome for one model in a [`MockInferenceClient`].
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Status(u16),
}

/// Mock inference client for testing: replies per model id and records
/// the order models were called in.
#[derive(Default)]
pub struct MockInferenceClient {
    replies: HashMap<String, MockReply>,
    calls: Mutex<Vec<String>>,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// `model_id` answers with `text`.
    pub fn respond(mut self, model_id: &str, text: &str) -> Self {
        self.replies
            .insert(model_id.to_string(), MockReply::Text(text.to_string()));
        self
    }

    /// `model_id` answers with HTTP `status`.
    pub fn fail(mut self, model_id: &str, status: u16) -> Self {
        self.replies
            .insert(model_id.to_string(), MockReply::Status(status));
        self
    }

    /// Model ids in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl InferenceClient for MockInferenceClient {
    fn generate(&self, settings: &ModelSettings, _prompt: &str) -> Result<String, StructuringError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(settings.model_id.clone());
        }
        match self.replies.get(&settings.model_id) {
            Some(MockReply::Text(text)) => Ok(text.clone()),
            Some(MockReply::Status(status)) => Err(StructuringError::ServiceError {
                status: *status,
                body: "mock failure".into(),
            }),
            None => Err(StructuringError::ServiceError {
                status: 404,
                body: format!("unknown model {}", settings.model_id),
            }),
        }
    }
}
