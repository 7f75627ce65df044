//! Gemini answer generation.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use nepisirsem_gemini::{FinishReason, Gemini, GenerationResponse, Model};

use crate::llm::{GenerationRequest, Llm, LlmError, Result};

/// Default model for answer generation.
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.5-flash";

/// An [`Llm`] backed by Gemini `generateContent`.
pub struct GeminiModel {
    client: Gemini,
    model_name: String,
}

impl GeminiModel {
    pub fn new(api_key: impl AsRef<str>, model: impl AsRef<str>) -> Result<Self> {
        let client = Gemini::with_model(api_key, Model::from_name(model.as_ref()))
            .map_err(|e| LlmError::Config(e.to_string()))?;
        Ok(Self::from_client(client))
    }

    /// Wrap an existing client, e.g. one pointed at a custom base URL.
    pub fn from_client(client: Gemini) -> Self {
        let model_name = client.model().id().to_string();
        Self { client, model_name }
    }

    fn answer_text(&self, response: GenerationResponse) -> Result<String> {
        if let Some(reason) = response.block_reason() {
            return Err(LlmError::Blocked {
                model: self.model_name.clone(),
                reason: format!("prompt blocked: {reason:?}"),
            });
        }

        let text = response.text();
        if !text.trim().is_empty() {
            if response.finish_reason() == Some(FinishReason::MaxTokens) {
                warn!(model = %self.model_name, "answer truncated at max output tokens");
            }
            return Ok(text);
        }

        match response.finish_reason() {
            Some(
                reason @ (FinishReason::Safety
                | FinishReason::Recitation
                | FinishReason::Blocklist
                | FinishReason::ProhibitedContent
                | FinishReason::Spii),
            ) => Err(LlmError::Blocked {
                model: self.model_name.clone(),
                reason: format!("answer withheld: {reason:?}"),
            }),
            _ => Err(LlmError::EmptyResponse { model: self.model_name.clone() }),
        }
    }
}

#[async_trait]
impl Llm for GeminiModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    #[instrument(skip_all, fields(model = %self.model_name, prompt_len = request.prompt.len()))]
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let mut builder = self
            .client
            .generate_content()
            .with_user_message(request.prompt)
            .with_temperature(request.temperature);
        if let Some(max_output_tokens) = request.max_output_tokens {
            builder = builder.with_max_output_tokens(max_output_tokens);
        }

        let response = builder.execute().await.map_err(|e| LlmError::Request {
            model: self.model_name.clone(),
            message: e.to_string(),
        })?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                answer_tokens = usage.candidates_token_count,
                "generation finished"
            );
        }

        self.answer_text(response)
    }
}

#[cfg(test)]
mod tests {
    use nepisirsem_gemini::{BlockReason, Candidate, Content, Part, PromptFeedback};

    use super::*;

    fn model() -> GeminiModel {
        GeminiModel::new("test-key", DEFAULT_GENERATION_MODEL).unwrap()
    }

    fn response(parts: Vec<Part>, finish_reason: Option<FinishReason>) -> GenerationResponse {
        GenerationResponse {
            candidates: vec![Candidate {
                content: Some(Content { parts, role: None }),
                finish_reason,
                index: Some(0),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn name_has_no_resource_prefix() {
        assert_eq!(model().name(), "gemini-2.5-flash");
        assert_eq!(GeminiModel::new("k", "models/gemini-2.5-pro").unwrap().name(), "gemini-2.5-pro");
    }

    #[test]
    fn text_of_first_candidate_is_returned() {
        let text = model()
            .answer_text(response(vec![Part::text("Afiyet "), Part::text("olsun")], Some(FinishReason::Stop)))
            .unwrap();
        assert_eq!(text, "Afiyet olsun");
    }

    #[test]
    fn empty_and_blocked_answers_are_errors() {
        let empty = model().answer_text(response(vec![], Some(FinishReason::Stop))).unwrap_err();
        assert!(matches!(empty, LlmError::EmptyResponse { .. }));

        let safety = model().answer_text(response(vec![], Some(FinishReason::Safety))).unwrap_err();
        assert!(matches!(safety, LlmError::Blocked { .. }));

        let blocked_prompt = GenerationResponse {
            prompt_feedback: Some(PromptFeedback { block_reason: Some(BlockReason::Safety) }),
            ..Default::default()
        };
        assert!(matches!(model().answer_text(blocked_prompt), Err(LlmError::Blocked { .. })));
    }
}
