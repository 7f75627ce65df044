//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] keeps records in a `BTreeMap` behind a
//! `tokio::sync::RwLock`. Nothing survives the process; it is meant for tests
//! and one-off runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{IndexManifest, SearchResult, VectorRecord};
use crate::error::{RagError, Result};
use crate::vectorstore::{VectorStore, check_dimensions, rank};

#[derive(Debug, Default)]
struct State {
    records: BTreeMap<String, VectorRecord>,
    dimensions: Option<usize>,
    manifest: Option<IndexManifest>,
}

/// An in-memory vector store using cosine similarity for search.
///
/// # Example
///
/// ```rust,ignore
/// use nepisirsem_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.put(&records).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    state: RwLock<State>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn put(&self, records: &[VectorRecord]) -> Result<()> {
        let mut state = self.state.write().await;
        state.dimensions = check_dimensions(state.dimensions, records)?;
        for record in records {
            state.records.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let state = self.state.read().await;
        if let Some(expected) = state.dimensions {
            if expected != embedding.len() {
                return Err(RagError::DimensionMismatch { expected, actual: embedding.len() });
            }
        }
        Ok(rank(state.records.values(), embedding, top_k))
    }

    async fn reset(&self) -> Result<()> {
        *self.state.write().await = State::default();
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.state.read().await.records.len())
    }

    async fn write_manifest(&self, manifest: &IndexManifest) -> Result<()> {
        self.state.write().await.manifest = Some(manifest.clone());
        Ok(())
    }

    async fn manifest(&self) -> Result<Option<IndexManifest>> {
        Ok(self.state.read().await.manifest.clone())
    }
}
