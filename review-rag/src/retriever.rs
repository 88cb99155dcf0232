//! Query-time retrieval: over-fetch, rating filter, truncate, format.

use std::sync::Arc;

use tracing::info;

use crate::document::Document;
use crate::error::Result;
use crate::store::ReviewVectorStore;

/// How many raw candidates to fetch per requested result.
///
/// Over-fetching leaves room for the rating filter. It is a cushion, not a
/// guarantee: when fewer than `max_results` candidates survive the filter the
/// caller simply receives fewer results.
pub const OVERFETCH_FACTOR: usize = 2;

/// Retrieves the reviews most relevant to a question.
#[derive(Clone)]
pub struct ReviewRetriever {
    store: Arc<ReviewVectorStore>,
    max_results: usize,
}

impl ReviewRetriever {
    /// Create a retriever returning at most `max_results` documents per query.
    pub fn new(store: Arc<ReviewVectorStore>, max_results: usize) -> Self {
        Self { store, max_results }
    }

    /// The configured result limit (K).
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<ReviewVectorStore> {
        &self.store
    }

    /// Fetch `2 × K` candidates, drop those rated below `min_rating`, keep the first K.
    ///
    /// Unrated chunks count as rating 0. Results stay in the store's similarity order.
    pub async fn retrieve(&self, query: &str, min_rating: Option<f64>) -> Result<Vec<Document>> {
        let candidates = self.store.query(query, self.max_results * OVERFETCH_FACTOR).await?;
        let fetched = candidates.len();

        let results: Vec<Document> = candidates
            .into_iter()
            .filter(|doc| min_rating.is_none_or(|min| doc.metadata.rating.unwrap_or(0.0) >= min))
            .take(self.max_results)
            .collect();

        info!(fetched, returned = results.len(), min_rating = ?min_rating, "retrieval completed");
        Ok(results)
    }

    /// Render results as labelled blocks for the prompt. See [`format_context`].
    pub fn format_context(&self, results: &[Document]) -> String {
        format_context(results)
    }
}

/// Render each result as `"[Review {n} - Rating {rating}/5]\n{text}"`, blocks
/// separated by a blank line, numbered from 1 in the order given.
///
/// A missing rating renders as `?`.
pub fn format_context(results: &[Document]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let rating =
                doc.metadata.rating.map(|r| format!("{r}")).unwrap_or_else(|| "?".to_string());
            format!("[Review {} - Rating {rating}/5]\n{}", i + 1, doc.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
