//! In-memory vector store using cosine distance.
//!
//! This module provides [`InMemoryVectorStore`], a vector store backed by a
//! `Vec` protected by a `tokio::sync::RwLock`. Nothing survives the process;
//! it is suitable for tests and throwaway sessions.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Document, IndexedEntry};
use crate::error::Result;
use crate::vectorstore::{VectorStore, nearest};

/// An in-memory vector store using cosine distance for search.
///
/// # Example
///
/// ```rust,ignore
/// use review_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// assert_eq!(store.count().await?, 0);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<Vec<IndexedEntry>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn insert(&self, entries: &[IndexedEntry]) -> Result<()> {
        self.entries.write().await.extend_from_slice(entries);
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
        self.entries.write().await.clear();
        Ok(())
    }
}
