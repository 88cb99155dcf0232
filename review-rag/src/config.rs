//! Configuration for the review RAG pipeline.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ReviewRagError, Result};

/// Which embedding backend turns text into vectors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// A locally running Ollama server (`/api/embed`).
    #[default]
    Ollama,
    /// Offline feature-hashing embedder; no model server required.
    Hashing,
}

impl FromStr for EmbeddingBackend {
    type Err = ReviewRagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "hashing" => Ok(Self::Hashing),
            other => Err(ReviewRagError::ConfigError(format!(
                "unknown embedding backend '{other}' (expected 'ollama' or 'hashing')"
            ))),
        }
    }
}

/// Names of the input columns the loader reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Review body column.
    pub text: String,
    /// Numeric rating column (0–5).
    pub rating: String,
    /// Product identifier column.
    pub product_id: String,
    /// Optional one-line summary column.
    pub summary: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            text: "reviewText".to_string(),
            rating: "rating".to_string(),
            product_id: "asin".to_string(),
            summary: "summary".to_string(),
        }
    }
}

impl ColumnMapping {
    /// The columns every input file must carry, in reporting order.
    pub fn required(&self) -> [&str; 3] {
        [&self.text, &self.rating, &self.product_id]
    }
}

/// Configuration parameters for the review RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewRagConfig {
    /// Backend used to embed chunks and queries.
    pub embedding_backend: EmbeddingBackend,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Dimensionality of the embedding vectors.
    pub embedding_dimensions: usize,
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of results handed to the answer chain.
    pub max_results: usize,
    /// Reviews rated below this are dropped during cleaning.
    pub min_rating: Option<f64>,
    /// Generation model identifier.
    pub generation_model: String,
    /// Base URL of the Ollama server used for embedding and generation.
    pub ollama_base_url: String,
    /// Directory holding the persisted vector collection.
    pub vector_store_path: PathBuf,
    /// Name of the persisted collection.
    pub collection_name: String,
    /// Directory uploaded and raw review files are read from.
    pub raw_data_path: PathBuf,
    /// Per-request timeout for model calls. `None` blocks until the server answers.
    pub request_timeout_secs: Option<u64>,
    /// Input column names.
    pub columns: ColumnMapping,
}

impl Default for ReviewRagConfig {
    fn default() -> Self {
        Self {
            embedding_backend: EmbeddingBackend::Ollama,
            embedding_model: "all-minilm".to_string(),
            embedding_dimensions: 384,
            chunk_size: 512,
            chunk_overlap: 50,
            max_results: 5,
            min_rating: None,
            generation_model: "llama3.2".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            vector_store_path: PathBuf::from("data/vector_store"),
            collection_name: "product_reviews".to_string(),
            raw_data_path: PathBuf::from("data/raw"),
            request_timeout_secs: None,
            columns: ColumnMapping::default(),
        }
    }
}

impl ReviewRagConfig {
    /// Create a new builder for constructing a [`ReviewRagConfig`].
    pub fn builder() -> ReviewRagConfigBuilder {
        ReviewRagConfigBuilder::default()
    }

    /// The configured request timeout, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Read configuration from `REVIEW_RAG_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Recognized variables: `REVIEW_RAG_EMBEDDING_BACKEND`, `REVIEW_RAG_EMBEDDING_MODEL`,
    /// `REVIEW_RAG_EMBEDDING_DIMENSIONS`, `REVIEW_RAG_CHUNK_SIZE`, `REVIEW_RAG_CHUNK_OVERLAP`,
    /// `REVIEW_RAG_MAX_RESULTS`, `REVIEW_RAG_MIN_RATING`, `REVIEW_RAG_GENERATION_MODEL`,
    /// `REVIEW_RAG_OLLAMA_URL`, `REVIEW_RAG_VECTOR_STORE_PATH`, `REVIEW_RAG_COLLECTION`,
    /// `REVIEW_RAG_RAW_DATA_PATH` and `REVIEW_RAG_REQUEST_TIMEOUT_SECS`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut builder = Self::builder();

        if let Some(value) = var("REVIEW_RAG_EMBEDDING_BACKEND") {
            builder = builder.embedding_backend(value.parse()?);
        }
        if let Some(value) = var("REVIEW_RAG_EMBEDDING_MODEL") {
            builder = builder.embedding_model(value);
        }
        if let Some(value) = var("REVIEW_RAG_EMBEDDING_DIMENSIONS") {
            builder = builder.embedding_dimensions(parse_var("REVIEW_RAG_EMBEDDING_DIMENSIONS", &value)?);
        }
        if let Some(value) = var("REVIEW_RAG_CHUNK_SIZE") {
            builder = builder.chunk_size(parse_var("REVIEW_RAG_CHUNK_SIZE", &value)?);
        }
        if let Some(value) = var("REVIEW_RAG_CHUNK_OVERLAP") {
            builder = builder.chunk_overlap(parse_var("REVIEW_RAG_CHUNK_OVERLAP", &value)?);
        }
        if let Some(value) = var("REVIEW_RAG_MAX_RESULTS") {
            builder = builder.max_results(parse_var("REVIEW_RAG_MAX_RESULTS", &value)?);
        }
        if let Some(value) = var("REVIEW_RAG_MIN_RATING") {
            builder = builder.min_rating(Some(parse_var("REVIEW_RAG_MIN_RATING", &value)?));
        }
        if let Some(value) = var("REVIEW_RAG_GENERATION_MODEL") {
            builder = builder.generation_model(value);
        }
        if let Some(value) = var("REVIEW_RAG_OLLAMA_URL") {
            builder = builder.ollama_base_url(value);
        }
        if let Some(value) = var("REVIEW_RAG_VECTOR_STORE_PATH") {
            builder = builder.vector_store_path(value);
        }
        if let Some(value) = var("REVIEW_RAG_COLLECTION") {
            builder = builder.collection_name(value);
        }
        if let Some(value) = var("REVIEW_RAG_RAW_DATA_PATH") {
            builder = builder.raw_data_path(value);
        }
        if let Some(value) = var("REVIEW_RAG_REQUEST_TIMEOUT_SECS") {
            builder = builder
                .request_timeout_secs(Some(parse_var("REVIEW_RAG_REQUEST_TIMEOUT_SECS", &value)?));
        }

        builder.build()
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| ReviewRagError::ConfigError(format!("{key} has an invalid value: '{value}'")))
}

/// Builder for constructing a validated [`ReviewRagConfig`].
#[derive(Debug, Clone, Default)]
pub struct ReviewRagConfigBuilder {
    config: ReviewRagConfig,
}

impl ReviewRagConfigBuilder {
    /// Set the embedding backend.
    pub fn embedding_backend(mut self, backend: EmbeddingBackend) -> Self {
        self.config.embedding_backend = backend;
        self
    }

    /// Set the embedding model identifier.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the embedding dimensionality.
    pub fn embedding_dimensions(mut self, dimensions: usize) -> Self {
        self.config.embedding_dimensions = dimensions;
        self
    }

    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of results handed to the answer chain.
    pub fn max_results(mut self, k: usize) -> Self {
        self.config.max_results = k;
        self
    }

    /// Set the rating below which reviews are dropped at cleaning time.
    pub fn min_rating(mut self, rating: Option<f64>) -> Self {
        self.config.min_rating = rating;
        self
    }

    /// Set the generation model identifier.
    pub fn generation_model(mut self, model: impl Into<String>) -> Self {
        self.config.generation_model = model.into();
        self
    }

    /// Set the Ollama base URL.
    pub fn ollama_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.ollama_base_url = url.into();
        self
    }

    /// Set the vector store directory.
    pub fn vector_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.vector_store_path = path.into();
        self
    }

    /// Set the collection name.
    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.config.collection_name = name.into();
        self
    }

    /// Set the raw data directory.
    pub fn raw_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.raw_data_path = path.into();
        self
    }

    /// Set the per-request timeout for model calls.
    pub fn request_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    /// Set the input column names.
    pub fn columns(mut self, columns: ColumnMapping) -> Self {
        self.config.columns = columns;
        self
    }

    /// Build the [`ReviewRagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewRagError::ConfigError`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `max_results == 0` or `embedding_dimensions == 0`
    /// - `min_rating` lies outside `0..=5`
    /// - a model name or the collection name is empty
    pub fn build(self) -> Result<ReviewRagConfig> {
        let config = self.config;
        if config.chunk_overlap >= config.chunk_size {
            return Err(ReviewRagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        if config.max_results == 0 {
            return Err(ReviewRagError::ConfigError(
                "max_results must be greater than zero".to_string(),
            ));
        }
        if config.embedding_dimensions == 0 {
            return Err(ReviewRagError::ConfigError(
                "embedding_dimensions must be greater than zero".to_string(),
            ));
        }
        if let Some(rating) = config.min_rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(ReviewRagError::ConfigError(format!(
                    "min_rating ({rating}) must be between 0 and 5"
                )));
            }
        }
        if config.embedding_model.trim().is_empty() || config.generation_model.trim().is_empty() {
            return Err(ReviewRagError::ConfigError("model names must not be empty".to_string()));
        }
        if config.collection_name.trim().is_empty() {
            return Err(ReviewRagError::ConfigError(
                "collection_name must not be empty".to_string(),
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ReviewRagConfig::default();
        assert_eq!(config.chunk_size, 512);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.max_results, 5);
        assert_eq!(config.min_rating, None);
        assert_eq!(config.columns.required(), ["reviewText", "rating", "asin"]);
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn builder_rejects_overlap_not_below_size() {
        let err = ReviewRagConfig::builder().chunk_size(50).chunk_overlap(50).build().unwrap_err();
        assert!(matches!(err, ReviewRagError::ConfigError(_)));
    }

    #[test]
    fn builder_rejects_out_of_range_min_rating() {
        let err = ReviewRagConfig::builder().min_rating(Some(6.0)).build().unwrap_err();
        assert!(err.to_string().contains("min_rating"));
    }

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("REVIEW_RAG_EMBEDDING_BACKEND", "hashing"),
            ("REVIEW_RAG_CHUNK_SIZE", "256"),
            ("REVIEW_RAG_MIN_RATING", "4"),
            ("REVIEW_RAG_REQUEST_TIMEOUT_SECS", "30"),
            ("REVIEW_RAG_COLLECTION", "  "),
        ]);
        let config =
            ReviewRagConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.embedding_backend, EmbeddingBackend::Hashing);
        assert_eq!(config.chunk_size, 256);
        assert_eq!(config.min_rating, Some(4.0));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.collection_name, "product_reviews");
    }

    #[test]
    fn lookup_reports_malformed_numbers_by_name() {
        let err = ReviewRagConfig::from_lookup(|key| {
            (key == "REVIEW_RAG_MAX_RESULTS").then(|| "five".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("REVIEW_RAG_MAX_RESULTS"));
    }
}
