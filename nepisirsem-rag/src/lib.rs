//! # nepisirsem-rag
//!
//! Indexing and retrieval for the Ne Pişirsem recipe assistant.
//!
//! A recipe collection is loaded ([`load_document`]), split into overlapping
//! chunks ([`Chunker`]), embedded ([`EmbeddingProvider`]) and persisted in a
//! [`VectorStore`] together with an [`IndexManifest`]. At question time the
//! [`RagPipeline`] embeds the question, fetches the closest chunks and the
//! [`PromptTemplate`] turns them into a grounded prompt.
//!
//! ## Features
//!
//! - `gemini` (default): [`GeminiEmbeddingProvider`]
//! - `sled` (default): durable [`SledVectorStore`]
//! - `pdf` (default): PDF support in [`load_document`]

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod loader;
pub mod mock;
pub mod pipeline;
pub mod prompt;
pub mod vectorstore;

#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "sled")]
pub mod sled_store;

pub use chunking::{Chunker, FixedSizeChunker, RecursiveChunker, TextSpan};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, IndexManifest, Metadata, Page, SearchResult, VectorRecord};
pub use embedding::{EmbeddingProvider, RetryPolicy, RetryingEmbeddingProvider};
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorStore;
pub use loader::{load_document, split_pages};
pub use mock::MockEmbeddingProvider;
pub use pipeline::{IndexReport, RagPipeline, RagPipelineBuilder};
pub use prompt::{DEFAULT_INSTRUCTIONS, PromptTemplate, REFUSAL_MESSAGE};
pub use vectorstore::{VectorStore, cosine_similarity};

#[cfg(feature = "gemini")]
pub use gemini::GeminiEmbeddingProvider;
#[cfg(feature = "sled")]
pub use sled_store::SledVectorStore;
