//! The review vector store: an embedding provider paired with a storage backend.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::document::{Document, IndexedEntry};
use crate::embedding::EmbeddingProvider;
use crate::error::{ReviewRagError, Result};
use crate::vectorstore::VectorStore;

/// Indexes review chunks and answers similarity queries over them.
///
/// Embedding happens here; the backend only stores vectors. The same
/// provider must embed both documents and queries, so changing the model
/// requires a [`reset`](ReviewVectorStore::reset) and full re-index.
#[derive(Clone)]
pub struct ReviewVectorStore {
    embedder: Arc<dyn EmbeddingProvider>,
    backend: Arc<dyn VectorStore>,
}

impl ReviewVectorStore {
    /// Pair an embedding provider with a storage backend.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, backend: Arc<dyn VectorStore>) -> Self {
        Self { embedder, backend }
    }

    /// The embedding provider.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Embed `documents` in one batch and append them to the index.
    ///
    /// No-op on empty input. Each chunk receives a fresh unique id.
    ///
    /// # Errors
    ///
    /// Propagates embedding and backend failures unchanged. A provider that
    /// returns the wrong number of vectors is reported as an
    /// [`ReviewRagError::EmbeddingError`].
    pub async fn add_documents(&self, documents: &[Document]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        let embeddings = self.embedder.embed(&texts).await.inspect_err(|e| {
            error!(error = %e, "embedding failed during indexing");
        })?;

        if embeddings.len() != documents.len() {
            return Err(ReviewRagError::EmbeddingError {
                provider: self.embedder.name().to_string(),
                message: format!(
                    "expected {} vectors, got {}",
                    documents.len(),
                    embeddings.len()
                ),
            });
        }

        let entries: Vec<IndexedEntry> = documents
            .iter()
            .zip(embeddings)
            .map(|(doc, embedding)| {
                let mut document = doc.clone();
                document.distance = None;
                IndexedEntry::new(document, embedding)
            })
            .collect();

        self.backend.insert(&entries).await.inspect_err(|e| {
            error!(error = %e, "vector store insert failed");
        })?;

        info!(chunk_count = entries.len(), "indexed chunks");
        Ok(())
    }

    /// Return up to `k` stored chunks closest to `query`, most similar first.
    pub async fn query(&self, query: &str, k: usize) -> Result<Vec<Document>> {
        let embedding = self.embedder.embed_query(query).await.inspect_err(|e| {
            error!(error = %e, "embedding failed during query");
        })?;
        let results = self.backend.search(&embedding, k).await?;
        debug!(k, result_count = results.len(), "vector query completed");
        Ok(results)
    }

    /// Total number of indexed chunks.
    pub async fn count(&self) -> Result<usize> {
        self.backend.count().await
    }

    /// Irreversibly discard the whole index.
    pub async fn reset(&self) -> Result<()> {
        self.backend.reset().await?;
        info!("vector store reset");
        Ok(())
    }
}
