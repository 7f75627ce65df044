//! Long-lived handles built once at startup.

use std::sync::Arc;

use anyhow::Context;
use nepisirsem_model::{GeminiModel, Llm, LlmError};
use nepisirsem_rag::{
    EmbeddingProvider, GeminiEmbeddingProvider, IndexManifest, IndexReport, RagError, RagPipeline,
    RetryPolicy, RetryingEmbeddingProvider, SledVectorStore, VectorStore, load_document,
};
use tracing::info;

use crate::assistant::RecipeAssistant;
use crate::config::{AppConfig, ConfigError};

/// Exit status for configuration problems: missing key, bad settings, or a
/// store that was never indexed with the configured model.
pub const EXIT_CONFIG: u8 = 2;
/// Exit status for any other failure, indexing included.
pub const EXIT_FAILURE: u8 = 1;

/// Gemini embeddings with retries on transient failures.
pub fn gemini_embedder(config: &AppConfig) -> Result<Arc<dyn EmbeddingProvider>, RagError> {
    let provider =
        GeminiEmbeddingProvider::new(config.api_key.expose(), config.embedding_model.as_str())?;
    Ok(Arc::new(RetryingEmbeddingProvider::new(Arc::new(provider), RetryPolicy::default())))
}

pub fn build_pipeline(
    config: &AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
) -> Result<RagPipeline, RagError> {
    RagPipeline::builder()
        .config(config.rag.clone())
        .embedding_provider(embedder)
        .vector_store(store)
        .build()
}

fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn VectorStore>> {
    let store = SledVectorStore::open(&config.store_dir)
        .with_context(|| format!("vektör veritabanı açılamadı: {}", config.store_dir.display()))?;
    Ok(Arc::new(store))
}

/// Load the configured source document and rebuild the store from it.
pub async fn build_index(config: &AppConfig) -> anyhow::Result<IndexReport> {
    let embedder = gemini_embedder(config)?;
    let store = open_store(config)?;
    let pipeline = build_pipeline(config, embedder, store)?;

    let document = load_document(&config.source).await?;
    let report = pipeline
        .index(&document)
        .await
        .with_context(|| format!("'{}' indekslenemedi", config.source.display()))?;
    Ok(report)
}

/// Everything a question needs, constructed once and reused for every turn.
pub struct AppContext {
    assistant: RecipeAssistant,
    manifest: IndexManifest,
}

impl AppContext {
    /// Open the store, check that it holds a finished index built with the
    /// configured embedding model, and create the generation model.
    pub async fn initialize(config: &AppConfig) -> anyhow::Result<Self> {
        let embedder = gemini_embedder(config)?;
        let store = open_store(config)?;
        let pipeline = Arc::new(build_pipeline(config, embedder, store)?);
        let model: Arc<dyn Llm> =
            Arc::new(GeminiModel::new(config.api_key.expose(), &config.generation_model)?);

        Self::from_parts(RecipeAssistant::new(pipeline, model)).await
    }

    /// Wrap an already assembled assistant after checking its store.
    pub async fn from_parts(assistant: RecipeAssistant) -> anyhow::Result<Self> {
        let manifest = assistant.pipeline().ensure_ready().await?;
        info!(
            source = %manifest.source,
            records = manifest.record_count,
            embedding_model = %manifest.embedding_model,
            generation_model = assistant.model_name(),
            "assistant ready"
        );
        Ok(Self { assistant, manifest })
    }

    pub fn assistant(&self) -> &RecipeAssistant {
        &self.assistant
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }
}

/// Map an error to the process exit status.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let is_config = err.chain().any(|cause| {
        cause.downcast_ref::<ConfigError>().is_some()
            || cause.downcast_ref::<RagError>().is_some_and(RagError::is_config)
            || matches!(cause.downcast_ref::<LlmError>(), Some(LlmError::Config(_)))
    });
    if is_config { EXIT_CONFIG } else { EXIT_FAILURE }
}
