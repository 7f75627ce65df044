//! Question answering: retrieve → render → generate.

use std::sync::Arc;

use nepisirsem_model::{GenerationRequest, Llm, LlmError};
use nepisirsem_rag::{PromptTemplate, RagError, RagPipeline, SearchResult};
use nepisirsem_session::{Role, Session};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("soru boş olamaz")]
    EmptyQuestion,

    #[error("tarifler aranırken hata oluştu: {0}")]
    Retrieval(#[from] RagError),

    #[error("cevap üretilirken hata oluştu: {0}")]
    Generation(#[from] LlmError),
}

/// One retrieved chunk an answer was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    pub chunk_id: String,
    pub page: Option<String>,
    pub score: f32,
}

impl From<&SearchResult> for SourceRef {
    fn from(result: &SearchResult) -> Self {
        Self {
            chunk_id: result.record.id.clone(),
            page: result.record.metadata.get("page").cloned(),
            score: result.score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

/// Machine-readable output of a single question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryOutput {
    pub answer: String,
}

impl From<&Answer> for QueryOutput {
    fn from(answer: &Answer) -> Self {
        Self { answer: answer.answer.clone() }
    }
}

/// Answers recipe questions from the indexed collection.
///
/// Each question is answered on its own: conversation history is kept for
/// display only and never reaches retrieval or the prompt.
pub struct RecipeAssistant {
    pipeline: Arc<RagPipeline>,
    model: Arc<dyn Llm>,
    template: PromptTemplate,
}

impl RecipeAssistant {
    pub fn new(pipeline: Arc<RagPipeline>, model: Arc<dyn Llm>) -> Self {
        Self { pipeline, model, template: PromptTemplate::default() }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn pipeline(&self) -> &Arc<RagPipeline> {
        &self.pipeline
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    #[instrument(skip_all, fields(model = %self.model.name()))]
    pub async fn answer(&self, question: &str) -> Result<Answer, AssistantError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }

        let results = self.pipeline.retrieve(question).await?;
        let prompt = self.template.render(&results, question);
        let text = self.model.generate(GenerationRequest::new(prompt)).await?;

        info!(chunks = results.len(), answer_len = text.len(), "answered question");

        Ok(Answer {
            question: question.to_string(),
            answer: text,
            sources: results.iter().map(SourceRef::from).collect(),
        })
    }

    /// Answer `question` and record the exchange in `session`.
    ///
    /// On failure the session is left exactly as it was.
    pub async fn respond(
        &self,
        session: &mut Session,
        question: &str,
    ) -> Result<Answer, AssistantError> {
        let answer = self.answer(question).await?;
        session.append(Role::User, answer.question.clone());
        session.append(Role::Assistant, answer.answer.clone());
        Ok(answer)
    }
}
