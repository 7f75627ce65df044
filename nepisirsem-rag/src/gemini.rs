//! Gemini embedding provider using the `nepisirsem-gemini` crate.
//!
//! This module is only available when the `gemini` feature is enabled.

use async_trait::async_trait;
use tracing::{debug, error};

use nepisirsem_gemini::{EmbedBuilder, Gemini, Model, TaskType};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Largest number of texts the API accepts in one `batchEmbedContents` call.
pub const MAX_BATCH_SIZE: usize = 100;

/// An [`EmbeddingProvider`] backed by the Gemini embedding API.
///
/// Queries are embedded with [`TaskType::RetrievalQuery`] and document chunks
/// with [`TaskType::RetrievalDocument`], both against the same model so that
/// stored vectors and query vectors share one space.
///
/// # Example
///
/// ```rust,ignore
/// use nepisirsem_rag::gemini::GeminiEmbeddingProvider;
///
/// let provider = GeminiEmbeddingProvider::new("your-api-key", "text-embedding-004")?;
/// let embedding = provider.embed("mercimek çorbası").await?;
/// ```
pub struct GeminiEmbeddingProvider {
    client: Gemini,
    model_id: String,
    output_dimensionality: Option<i32>,
    dimensions: usize,
}

impl GeminiEmbeddingProvider {
    /// Create a provider for `model` (e.g. `text-embedding-004`).
    pub fn new(api_key: impl AsRef<str>, model: impl Into<Model>) -> Result<Self> {
        let client = Gemini::with_model(api_key, model).map_err(|e| {
            RagError::embedding("Gemini", format!("failed to create Gemini client: {e}"))
        })?;
        Ok(Self::from_client(client))
    }

    /// Create a provider from an existing [`Gemini`] client, e.g. one
    /// pointed at a custom base URL.
    pub fn from_client(client: Gemini) -> Self {
        let model_id = client.model().id().to_string();
        let dimensions = default_dimensions(client.model());
        Self { client, model_id, output_dimensionality: None, dimensions }
    }

    /// Ask the API to truncate vectors to `dims` components.
    pub fn with_output_dimensionality(mut self, dims: usize) -> Self {
        self.output_dimensionality = i32::try_from(dims).ok();
        self.dimensions = dims;
        self
    }

    fn embed_builder(&self, task_type: TaskType) -> EmbedBuilder {
        let builder = self.client.embed_content().with_task_type(task_type);
        match self.output_dimensionality {
            Some(dims) => builder.with_output_dimensionality(dims),
            None => builder,
        }
    }

    fn api_error(e: nepisirsem_gemini::Error) -> RagError {
        RagError::EmbeddingError {
            provider: "Gemini".into(),
            message: e.to_string(),
            transient: e.is_transient(),
        }
    }
}

fn default_dimensions(model: &Model) -> usize {
    match model {
        Model::GeminiEmbedding001 => 3072,
        _ => 768,
    }
}

fn non_empty(values: Vec<f32>) -> Result<Vec<f32>> {
    if values.is_empty() {
        return Err(RagError::embedding("Gemini", "response contained an empty embedding"));
    }
    Ok(values)
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Gemini", text_len = text.len(), "embedding query");

        let response = self
            .embed_builder(TaskType::RetrievalQuery)
            .with_text(text)
            .execute()
            .await
            .map_err(|e| {
                error!(provider = "Gemini", error = %e, transient = e.is_transient(), "embedding request failed");
                Self::api_error(e)
            })?;

        non_empty(response.embedding.values)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(MAX_BATCH_SIZE) {
            debug!(provider = "Gemini", batch_size = batch.len(), "embedding document batch");

            let response = self
                .embed_builder(TaskType::RetrievalDocument)
                .with_chunks(batch.iter().map(|t| t.to_string()).collect())
                .execute_batch()
                .await
                .map_err(|e| {
                    error!(provider = "Gemini", error = %e, transient = e.is_transient(), "batch embedding request failed");
                    Self::api_error(e)
                })?;

            if response.embeddings.len() != batch.len() {
                return Err(RagError::embedding(
                    "Gemini",
                    format!(
                        "requested {} embeddings, received {}",
                        batch.len(),
                        response.embeddings.len()
                    ),
                ));
            }
            for embedding in response.embeddings {
                embeddings.push(non_empty(embedding.values)?);
            }
        }

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
