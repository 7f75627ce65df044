//! Indexing and retrieval over one recipe collection.
//!
//!
//! ```rust,ignore
//! use nepisirsem_rag::{RagPipeline, RagConfig, SledVectorStore};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(SledVectorStore::open("./vector_db")?))
//!     .build()?;
//!
//! pipeline.index(&document).await?;
//! let results = pipeline.retrieve("Karnıyarık nasıl yapılır?").await?;
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::RagConfig;
use crate::document::{Document, IndexManifest, SearchResult, VectorRecord};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Summary of a completed indexing run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexReport {
    pub document_id: String,
    pub page_count: usize,
    pub chunk_count: usize,
    pub dimensions: usize,
    pub embedding_model: String,
}

/// Ties a [`Chunker`], an [`EmbeddingProvider`] and a [`VectorStore`] together.
///
/// Indexing runs reset → chunk → embed → store → manifest; retrieval runs
/// embed → search → threshold filter. Construct one via
/// [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
}

impl RagPipeline {
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Provider used for both documents and questions.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Rebuild the store from `document`.
    ///
    /// Previous contents are discarded first. The manifest is written only
    /// after every record is stored, so a run that fails part-way leaves a
    /// store that [`ensure_ready`](Self::ensure_ready) rejects.
    ///
    /// # Errors
    ///
    /// Returns the underlying error of the first step that fails, or
    /// [`RagError::PipelineError`] if the document yields no chunks.
    #[instrument(skip_all, fields(document.id = %document.id))]
    pub async fn index(&self, document: &Document) -> Result<IndexReport> {
        self.vector_store.reset().await.inspect_err(|e| {
            error!(error = %e, "failed to reset vector store");
        })?;

        let chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            return Err(RagError::PipelineError(format!(
                "document '{}' produced no chunks",
                document.id
            )));
        }
        info!(chunk_count = chunks.len(), pages = document.pages.len(), "chunked document");

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.inspect_err(|e| {
            error!(error = %e, "embedding failed during indexing");
        })?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::embedding(
                self.embedding_provider.model_id(),
                format!("expected {} embeddings, received {}", chunks.len(), embeddings.len()),
            ));
        }

        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| chunk.into_record(embedding))
            .collect();
        let dimensions = records.first().map(|r| r.embedding.len()).unwrap_or_default();

        self.vector_store.put(&records).await.inspect_err(|e| {
            error!(error = %e, "storing records failed during indexing");
        })?;

        let manifest = IndexManifest {
            source: document.source.clone(),
            document_id: document.id.clone(),
            chunk_size: self.config.chunk_size,
            chunk_overlap: self.config.chunk_overlap,
            embedding_model: self.embedding_provider.model_id().to_string(),
            dimensions,
            record_count: records.len(),
            indexed_at: Utc::now(),
        };
        self.vector_store.write_manifest(&manifest).await?;

        info!(chunk_count = records.len(), dimensions, "indexed document");

        Ok(IndexReport {
            document_id: document.id.clone(),
            page_count: document.pages.len(),
            chunk_count: records.len(),
            dimensions,
            embedding_model: manifest.embedding_model,
        })
    }

    /// Check that the store holds a completed index built with the current
    /// embedding model.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotIndexed`] if no manifest exists or it was
    /// written for another embedding model or dimensionality.
    pub async fn ensure_ready(&self) -> Result<IndexManifest> {
        let Some(manifest) = self.vector_store.manifest().await? else {
            return Err(RagError::NotIndexed(
                "no completed indexing run found; build the index first".to_string(),
            ));
        };

        let model_id = self.embedding_provider.model_id();
        if manifest.embedding_model != model_id {
            return Err(RagError::NotIndexed(format!(
                "index was built with embedding model '{}' but '{model_id}' is configured; rebuild the index",
                manifest.embedding_model
            )));
        }
        let dimensions = self.embedding_provider.dimensions();
        if manifest.dimensions != dimensions {
            return Err(RagError::NotIndexed(format!(
                "index holds {}-dimensional vectors but the embedder produces {dimensions}; rebuild the index",
                manifest.dimensions
            )));
        }
        Ok(manifest)
    }

    /// Retrieve the chunks most relevant to `question`.
    ///
    /// Returns at most `top_k` results ordered by descending similarity.
    /// Results below the configured `similarity_threshold` are dropped.
    #[instrument(skip_all, fields(question_len = question.chars().count()))]
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedding_provider.embed(question).await.inspect_err(|e| {
            error!(error = %e, "embedding failed during retrieval");
        })?;

        let results =
            self.vector_store.query(&query_embedding, self.config.top_k).await.inspect_err(|e| {
                error!(error = %e, "vector store query failed");
            })?;

        let threshold = self.config.similarity_threshold;
        let filtered: Vec<SearchResult> =
            results.into_iter().filter(|r| r.score >= threshold).collect();

        info!(result_count = filtered.len(), "retrieval completed");

        Ok(filtered)
    }
}

/// `config`, `embedding_provider` and `vector_store` are required. Without a
/// chunker, a [`RecursiveChunker`] sized from the config is used.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagPipelineBuilder {
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Override the default [`RecursiveChunker`].
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Fails with [`RagError::ConfigError`] naming the first missing part.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.ok_or_else(|| missing("config"))?;
        let embedding_provider =
            self.embedding_provider.ok_or_else(|| missing("embedding_provider"))?;
        let vector_store = self.vector_store.ok_or_else(|| missing("vector_store"))?;
        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap))
        });

        Ok(RagPipeline { config, embedding_provider, vector_store, chunker })
    }
}

fn missing(part: &str) -> RagError {
    RagError::ConfigError(format!("pipeline has no {part}"))
}
