//! Vector store trait for storing and searching vector embeddings.


use async_trait::async_trait;

use crate::document::{IndexManifest, SearchResult, VectorRecord};
use crate::error::{RagError, Result};

/// A storage backend for embedded chunks with similarity search.
///
/// A store holds the records of a single corpus. All records share one
/// dimensionality, fixed by the first [`put`](VectorStore::put) after a
/// [`reset`](VectorStore::reset). Records with an existing ID are replaced.
///
/// # Example
///
/// ```rust,ignore
/// use nepisirsem_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.put(&records).await?;
/// let results = store.query(&query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace records.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if a record's embedding length
    /// differs from the vectors already stored.
    async fn put(&self, records: &[VectorRecord]) -> Result<()>;

    /// The `top_k` records most similar to `embedding`, ordered by
    /// descending cosine similarity, ties broken by ascending record ID.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// Remove every record and the manifest.
    async fn reset(&self) -> Result<()>;

    /// Number of stored records.
    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Record that an indexing run completed.
    async fn write_manifest(&self, manifest: &IndexManifest) -> Result<()>;

    /// The manifest of the last completed indexing run, if any.
    async fn manifest(&self) -> Result<Option<IndexManifest>>;
}

/// Cosine similarity of two vectors. Returns 0.0 if either vector has zero
/// magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Score `records` against `embedding` and keep the best `top_k`.
pub(crate) fn rank<'a, I>(records: I, embedding: &[f32], top_k: usize) -> Vec<SearchResult>
where
    I: IntoIterator<Item = &'a VectorRecord>,
{
    let mut scored: Vec<SearchResult> = records
        .into_iter()
        .map(|record| SearchResult {
            score: cosine_similarity(&record.embedding, embedding),
            record: record.clone(),
        })
        .collect();

    // NaN scores rank below everything else
    let key = |score: f32| if score.is_nan() { f32::NEG_INFINITY } else { score };
    scored.sort_by(|a, b| {
        key(b.score).total_cmp(&key(a.score)).then_with(|| a.record.id.cmp(&b.record.id))
    });
    scored.truncate(top_k);
    scored
}

/// Check that every record has `expected` dimensions, or agree on a common
/// dimensionality when the store is still empty. Returns the dimensionality.
pub(crate) fn check_dimensions(expected: Option<usize>, records: &[VectorRecord]) -> Result<Option<usize>> {
    let mut dims = expected;
    for record in records {
        let actual = record.embedding.len();
        match dims {
            Some(expected) if expected != actual => {
                return Err(RagError::DimensionMismatch { expected, actual });
            }
            Some(_) => {}
            None => dims = Some(actual),
        }
    }
    Ok(dims)
}
