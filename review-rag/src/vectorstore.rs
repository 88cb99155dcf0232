//! Vector store trait for persisting and searching embedded chunks.

use std::cmp::Ordering;

use async_trait::async_trait;

use crate::document::{Document, IndexedEntry};
use crate::error::Result;

/// A storage backend for embedded review chunks with cosine-distance search.
///
/// The store is append-only: entries are inserted and never mutated, and the
/// only way to remove anything is [`reset`](VectorStore::reset), which
/// discards the whole collection.
///
/// # Example
///
/// ```rust,ignore
/// use review_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.insert(&entries).await?;
/// let results = store.search(&query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append entries to the collection. Existing entries are untouched.
    async fn insert(&self, entries: &[IndexedEntry]) -> Result<()>;

    /// Return up to `top_k` stored documents closest to `embedding`.
    ///
    /// Results carry their cosine distance and are ordered by ascending distance.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<Document>>;

    /// Number of stored entries.
    async fn count(&self) -> Result<usize>;

    /// Discard every entry, leaving an empty collection that can still be queried.
    async fn reset(&self) -> Result<()>;
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Cosine distance, `1 - cosine_similarity`. Ranges over `0.0..=2.0`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Exhaustive nearest-neighbour search shared by the bundled backends.
///
/// Ties keep insertion order.
pub(crate) fn nearest(entries: &[IndexedEntry], embedding: &[f32], top_k: usize) -> Vec<Document> {
    let mut scored: Vec<(f32, &IndexedEntry)> =
        entries.iter().map(|entry| (cosine_distance(&entry.embedding, embedding), entry)).collect();

    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    scored.truncate(top_k);
    scored.into_iter().map(|(distance, entry)| entry.document.clone().with_distance(distance)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_zero_distance() {
        let v = [0.3, 0.4, 0.5];
        assert!(cosine_distance(&v, &v).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_has_no_similarity() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn opposite_vectors_are_farthest() {
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
    }
}
