//! Error types for the `nepisirsem-rag` crate.

use thiserror::Error;

/// Errors that can occur while indexing or retrieving.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
        /// Whether repeating the same call may succeed (rate limits, 5xx,
        /// dropped connections).
        transient: bool,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector does not have the dimensionality of the vectors already stored.
    #[error("Embedding dimension mismatch: store holds {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The source document could not be read or parsed.
    #[error("Failed to load document '{path}': {message}")]
    LoaderError { path: String, message: String },

    /// The store has never been indexed, or the last indexing run did not finish.
    #[error("Vector store is not indexed: {0}")]
    NotIndexed(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

impl RagError {
    /// Whether this error stems from configuration rather than a runtime failure.
    pub fn is_config(&self) -> bool {
        matches!(self, RagError::ConfigError(_) | RagError::NotIndexed(_))
    }

    /// An embedding failure that retrying will not fix.
    pub fn embedding(provider: impl Into<String>, message: impl Into<String>) -> Self {
        RagError::EmbeddingError {
            provider: provider.into(),
            message: message.into(),
            transient: false,
        }
    }

    /// Whether the failed call is worth repeating.
    pub fn is_transient(&self) -> bool {
        matches!(self, RagError::EmbeddingError { transient: true, .. })
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
