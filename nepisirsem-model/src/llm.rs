//! The model abstraction the assistant generates answers through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single-turn generation request. The prompt already carries the
/// instructions, the retrieved context and the question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Sampling temperature; `0.0` keeps answers deterministic.
    pub temperature: f32,
    pub max_output_tokens: Option<i32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), temperature: 0.0, max_output_tokens: None }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: i32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    /// The client could not be created, e.g. a malformed API key.
    #[error("Model configuration error: {0}")]
    Config(String),

    /// The request failed in transport or the service returned an error status.
    #[error("Model request failed ({model}): {message}")]
    Request { model: String, message: String },

    /// The prompt or the answer was withheld by the provider's safety filters.
    #[error("Model response was blocked ({model}): {reason}")]
    Blocked { model: String, reason: String },

    /// The model returned no text.
    #[error("Model returned an empty response ({model})")]
    EmptyResponse { model: String },
}

pub type Result<T> = std::result::Result<T, LlmError>;

/// A text generation model.
#[async_trait]
pub trait Llm: Send + Sync {
    /// Model identifier, e.g. `gemini-2.5-flash`.
    fn name(&self) -> &str;

    /// Generate the answer text for `request`.
    async fn generate(&self, request: GenerationRequest) -> Result<String>;
}
