//! Embedding request and response types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::{Error, GeminiClient};
use crate::generation::Content;

/// Intended downstream use of an embedding; lets the model optimise the
/// vector for either side of a retrieval comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    RetrievalQuery,
    RetrievalDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    pub model: String,
    pub content: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dimensionality: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchEmbedContentsRequest {
    pub requests: Vec<EmbedContentRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentEmbedding {
    #[serde(default)]
    pub values: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedContentResponse {
    pub embedding: ContentEmbedding,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchEmbedContentsResponse {
    #[serde(default)]
    pub embeddings: Vec<ContentEmbedding>,
}

/// Builder for `embedContent` and `batchEmbedContents` calls.
pub struct EmbedBuilder {
    client: Arc<GeminiClient>,
    chunks: Vec<String>,
    task_type: Option<TaskType>,
    output_dimensionality: Option<i32>,
}

impl EmbedBuilder {
    pub(crate) fn new(client: Arc<GeminiClient>) -> Self {
        Self { client, chunks: Vec::new(), task_type: None, output_dimensionality: None }
    }

    /// Embed a single text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.chunks = vec![text.into()];
        self
    }

    /// Embed several texts in one batch call.
    pub fn with_chunks(mut self, chunks: Vec<String>) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    pub fn with_output_dimensionality(mut self, dims: i32) -> Self {
        self.output_dimensionality = Some(dims);
        self
    }

    fn request_for(&self, text: &str) -> EmbedContentRequest {
        EmbedContentRequest {
            model: self.client.model.to_string(),
            content: Content::text(text),
            task_type: self.task_type,
            output_dimensionality: self.output_dimensionality,
        }
    }

    /// Embed the first text set on this builder.
    pub async fn execute(self) -> Result<EmbedContentResponse, Error> {
        let text = self.chunks.first().map(String::as_str).unwrap_or_default();
        let request = self.request_for(text);
        self.client.embed_content(&request).await
    }

    /// Embed every text set on this builder, preserving order.
    pub async fn execute_batch(self) -> Result<BatchEmbedContentsResponse, Error> {
        let request = BatchEmbedContentsRequest {
            requests: self.chunks.iter().map(|chunk| self.request_for(chunk)).collect(),
        };
        self.client.embed_content_batch(&request).await
    }
}
