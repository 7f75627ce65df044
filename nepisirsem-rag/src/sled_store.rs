//! Durable vector store on top of the `sled` embedded database.
//!
//! This module is only available when the `sled` feature is enabled.
//!
//! Layout of the database directory:
//! - tree `records`: record ID → `bincode`-encoded [`VectorRecord`]
//! - tree `meta`: `dimensions` (u64, big endian) and `manifest` (JSON)

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::document::{IndexManifest, SearchResult, VectorRecord};
use crate::error::{RagError, Result};
use crate::vectorstore::{VectorStore, check_dimensions, rank};

const RECORDS_TREE: &str = "records";
const META_TREE: &str = "meta";
const DIMENSIONS_KEY: &str = "dimensions";
const MANIFEST_KEY: &str = "manifest";

fn store_error(e: impl std::fmt::Display) -> RagError {
    RagError::VectorStoreError { backend: "sled".to_string(), message: e.to_string() }
}

/// A [`VectorStore`] persisted in a directory, so an index built once can
/// be queried by later processes.
///
/// # Example
///
/// ```rust,ignore
/// use nepisirsem_rag::SledVectorStore;
///
/// let store = SledVectorStore::open("./vector_db")?;
/// let manifest = store.manifest().await?;
/// ```
#[derive(Debug, Clone)]
pub struct SledVectorStore {
    path: PathBuf,
    db: sled::Db,
    records: sled::Tree,
    meta: sled::Tree,
}

impl SledVectorStore {
    /// Open (or create) the store in `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(store_error)?;
        }
        let db = sled::open(&path).map_err(|e| RagError::VectorStoreError {
            backend: "sled".to_string(),
            message: format!("failed to open '{}': {e}", path.display()),
        })?;
        let records = db.open_tree(RECORDS_TREE).map_err(store_error)?;
        let meta = db.open_tree(META_TREE).map_err(store_error)?;
        debug!(path = %path.display(), records = records.len(), "opened vector store");
        Ok(Self { path, db, records, meta })
    }

    /// Directory holding the database.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn stored_dimensions(&self) -> Result<Option<usize>> {
        let Some(bytes) = self.meta.get(DIMENSIONS_KEY).map_err(store_error)? else {
            return Ok(None);
        };
        let raw: [u8; 8] = bytes[..].try_into().map_err(|_| {
            store_error(format!("corrupt '{DIMENSIONS_KEY}' entry of {} bytes", bytes.len()))
        })?;
        Ok(Some(u64::from_be_bytes(raw) as usize))
    }

    async fn flush(&self) -> Result<()> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || db.flush())
            .await
            .map_err(store_error)?
            .map_err(store_error)?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for SledVectorStore {
    async fn put(&self, records: &[VectorRecord]) -> Result<()> {
        let stored = self.stored_dimensions()?;
        let dimensions = check_dimensions(stored, records)?;

        let mut batch = sled::Batch::default();
        for record in records {
            let value = bincode::serialize(record).map_err(store_error)?;
            batch.insert(record.id.as_bytes(), value);
        }
        self.records.apply_batch(batch).map_err(store_error)?;

        if stored.is_none() {
            if let Some(dims) = dimensions {
                self.meta
                    .insert(DIMENSIONS_KEY, (dims as u64).to_be_bytes().to_vec())
                    .map_err(store_error)?;
            }
        }
        self.flush().await
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        if let Some(expected) = self.stored_dimensions()? {
            if expected != embedding.len() {
                return Err(RagError::DimensionMismatch { expected, actual: embedding.len() });
            }
        }

        let mut records = Vec::with_capacity(self.records.len());
        for item in self.records.iter() {
            let (_, value) = item.map_err(store_error)?;
            let record: VectorRecord = bincode::deserialize(&value).map_err(store_error)?;
            records.push(record);
        }
        Ok(rank(&records, embedding, top_k))
    }

    async fn reset(&self) -> Result<()> {
        // The manifest goes first so an interrupted reset never looks indexed.
        self.meta.remove(MANIFEST_KEY).map_err(store_error)?;
        self.flush().await?;
        self.records.clear().map_err(store_error)?;
        self.meta.clear().map_err(store_error)?;
        self.flush().await?;
        info!(path = %self.path.display(), "vector store cleared");
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    async fn write_manifest(&self, manifest: &IndexManifest) -> Result<()> {
        let value = serde_json::to_vec(manifest).map_err(store_error)?;
        self.meta.insert(MANIFEST_KEY, value).map_err(store_error)?;
        self.flush().await
    }

    async fn manifest(&self) -> Result<Option<IndexManifest>> {
        match self.meta.get(MANIFEST_KEY).map_err(store_error)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(store_error)?)),
            None => Ok(None),
        }
    }
}
