//! Embedding provider trait and an offline hashing embedder.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;

/// A provider that maps text to fixed-length vectors.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. [`embed`](EmbeddingProvider::embed) is the batch path used at
/// indexing time; [`embed_query`](EmbeddingProvider::embed_query) is the
/// single-text path used at query time.
///
/// # Example
///
/// ```rust,ignore
/// use review_rag::EmbeddingProvider;
///
/// let vector = provider.embed_query("Is it noisy?").await?;
/// assert_eq!(vector.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts. The result has one vector per input, in order.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query text.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// with a one-element batch.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text]).await?;
        vectors.pop().ok_or_else(|| crate::error::ReviewRagError::EmbeddingError {
            provider: self.name().to_string(),
            message: "provider returned no vector for the query".to_string(),
        })
    }

    /// Dimensionality of the vectors this provider produces.
    fn dimensions(&self) -> usize;

    /// Short provider name used in logs and errors.
    fn name(&self) -> &str;
}

/// Deterministic bag-of-words embedder using feature hashing.
///
/// Each lowercase alphanumeric token is hashed into one of `dimensions`
/// buckets and weighted by its term frequency; the vector is L2-normalised.
/// Texts sharing vocabulary land close together under cosine similarity,
/// which is enough for offline demos and tests.
#[derive(Debug, Clone)]
pub struct HashingEmbeddingProvider {
    dimensions: usize,
}

impl HashingEmbeddingProvider {
    /// Create a hashing embedder producing `dimensions`-long vectors.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1) }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let lowered = text.to_lowercase();
        let mut tf: HashMap<&str, usize> = HashMap::new();
        for token in lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            *tf.entry(token).or_insert(0) += 1;
        }

        for (token, count) in tf {
            vector[djb2(token) % self.dimensions] += count as f32;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbeddingProvider {
    fn default() -> Self {
        Self::new(384)
    }
}

fn djb2(s: &str) -> usize {
    s.bytes().fold(5381usize, |hash, b| hash.wrapping_mul(33).wrapping_add(b as usize))
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashing"
    }
}
