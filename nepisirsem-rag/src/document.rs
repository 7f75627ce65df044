//! Data types for documents, chunks, stored records and search results.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key-value metadata. Ordered so that stored records serialize identically
/// across runs.
pub type Metadata = BTreeMap<String, String>;

/// One page (or section) of raw text within a [`Document`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// 1-based page number in the source.
    pub number: u32,
    pub text: String,
}

/// A loaded source file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// Where the document was loaded from, usually a file path.
    pub source: String,
    /// Ordered pages of raw text.
    pub pages: Vec<Page>,
    /// Key-value metadata inherited by every chunk.
    pub metadata: Metadata,
}

impl Document {
    /// Create a document from its pages.
    pub fn new(id: impl Into<String>, source: impl Into<String>, pages: Vec<Page>) -> Self {
        Self { id: id.into(), source: source.into(), pages, metadata: Metadata::new() }
    }

    /// Create a single-page document.
    pub fn from_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        let id = id.into();
        let source = id.clone();
        Self::new(id, source, vec![Page { number: 1, text: text.into() }])
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether no page carries any non-whitespace text.
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.text.trim().is_empty())
    }
}

/// A contiguous span of one page of a [`Document`], not yet embedded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// `{document_id}_{chunk_index}`.
    pub id: String,
    pub text: String,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Document metadata plus `source`, `page`, `chunk_index` and `start_char`.
    pub metadata: Metadata,
}

impl Chunk {
    /// Attach an embedding, producing the unit persisted in a vector store.
    pub fn into_record(self, embedding: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: self.id,
            text: self.text,
            embedding,
            metadata: self.metadata,
            document_id: self.document_id,
        }
    }
}

/// A chunk together with its embedding, as stored in a vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
    pub document_id: String,
}

/// A retrieved [`VectorRecord`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub record: VectorRecord,
    /// Cosine similarity with the query (higher is more relevant).
    pub score: f32,
}

/// Written last by a successful indexing run; a store without one is not
/// usable for queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexManifest {
    pub source: String,
    pub document_id: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Model that produced the stored embeddings. Queries must use the same one.
    pub embedding_model: String,
    pub dimensions: usize,
    pub record_count: usize,
    pub indexed_at: DateTime<Utc>,
}
