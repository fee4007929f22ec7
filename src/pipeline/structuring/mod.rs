pub mod types;
pub mod prompt;
pub mod sanitize;
pub mod huggingface;
pub mod parser;
pub mod normalize;
pub mod heuristic;
pub mod cascade;

pub use types::*;
pub use prompt::*;
pub use sanitize::*;
pub use huggingface::*;
pub use parser::*;
pub use normalize::*;
pub use heuristic::*;
pub use cascade::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("Inference service unreachable at {0}")]
    ServiceConnection(String),

    #[error("Inference service returned error (status {status}): {body}")]
    ServiceError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response body parsing error: {0}")]
    ResponseParsing(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Nothing to structure: input text is empty")]
    EmptyInput,
}

impl StructuringError {
    /// True for failures of the model output itself rather than of the transport.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::MalformedResponse(_) | Self::JsonParsing(_))
    }

    /// HTTP status carried by a service error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServiceError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
