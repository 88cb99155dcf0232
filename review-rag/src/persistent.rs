//! Directory-backed vector store.
//!
//! A collection lives in `<dir>/<collection>.json`. The file is loaded once on
//! [`PersistentVectorStore::open`] and rewritten after every insert or reset
//! by writing a temporary sibling and renaming it over the original, so a
//! crash mid-write leaves the previous snapshot intact.
//!
//! The store assumes a single process owns the directory. There is no file
//! locking; two processes writing the same collection will overwrite each other.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::document::{Document, IndexedEntry};
use crate::error::{ReviewRagError, Result};
use crate::vectorstore::{VectorStore, nearest};

const BACKEND: &str = "persistent";

#[derive(Debug, Serialize, Deserialize)]
struct CollectionFile {
    name: String,
    metric: String,
    entries: Vec<IndexedEntry>,
}

/// A vector store persisted as one JSON file per collection.
///
/// # Example
///
/// ```rust,ignore
/// use review_rag::{PersistentVectorStore, VectorStore};
///
/// let store = PersistentVectorStore::open("data/vector_store", "product_reviews").await?;
/// println!("{} chunks indexed", store.count().await?);
/// ```
#[derive(Debug)]
pub struct PersistentVectorStore {
    name: String,
    path: PathBuf,
    entries: RwLock<Vec<IndexedEntry>>,
}

impl PersistentVectorStore {
    /// Open (or create) the collection `name` under `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewRagError::VectorStoreError`] if the directory cannot be
    /// created or an existing collection file cannot be read or parsed.
    pub async fn open(dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| store_error(format!("cannot create '{}': {e}", dir.display())))?;

        let path = dir.join(format!("{name}.json"));
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let file: CollectionFile = serde_json::from_slice(&bytes).map_err(|e| {
                    store_error(format!("corrupt collection file '{}': {e}", path.display()))
                })?;
                file.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(store_error(format!("cannot read '{}': {e}", path.display())));
            }
        };

        info!(collection = name, path = %path.display(), entries = entries.len(), "opened vector collection");
        Ok(Self { name: name.to_string(), path, entries: RwLock::new(entries) })
    }

    /// The collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the collection file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &[IndexedEntry]) -> Result<()> {
        let file = CollectionFile {
            name: self.name.clone(),
            metric: "cosine".to_string(),
            entries: entries.to_vec(),
        };
        let bytes = serde_json::to_vec(&file)
            .map_err(|e| store_error(format!("cannot serialize collection: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        let write = async {
            tokio::fs::write(&tmp, &bytes).await?;
            tokio::fs::rename(&tmp, &self.path).await
        };
        write.await.map_err(|e| {
            error!(path = %self.path.display(), error = %e, "failed to persist collection");
            store_error(format!("cannot write '{}': {e}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), entries = entries.len(), bytes = bytes.len(), "persisted collection");
        Ok(())
    }
}

fn store_error(message: String) -> ReviewRagError {
    ReviewRagError::VectorStoreError { backend: BACKEND.to_string(), message }
}

#[async_trait]
impl VectorStore for PersistentVectorStore {
    async fn insert(&self, entries: &[IndexedEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut current = self.entries.write().await;
        let mut next = current.clone();
        next.extend_from_slice(entries);
        self.persist(&next).await?;
        *current = next;
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<Document>> {
        let entries = self.entries.read().await;
        Ok(nearest(&entries, embedding, top_k))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }

    async fn reset(&self) -> Result<()> {
        let mut current = self.entries.write().await;
        self.persist(&[]).await?;
        current.clear();
        info!(collection = %self.name, "reset vector collection");
        Ok(())
    }
}
