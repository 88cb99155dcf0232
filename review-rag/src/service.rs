//! The review RAG service object.
//!
//! [`ReviewRagService`] owns one instance of every pipeline component. Build
//! it once at startup, wrap it in an `Arc`, and hand clones of that `Arc` to
//! whatever front end needs it (CLI, web server, evaluation harness).
//!
//! # Example
//!
//! ```rust,ignore
//! use review_rag::{ReviewRagConfig, ReviewRagService, Mode};
//!
//! let service = ReviewRagService::from_config(ReviewRagConfig::from_env()?).await?;
//! service.index_file("data/sample_reviews.json").await?;
//! let answer = service.ask("Is it loud?", Mode::Qa, None).await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::chain::{Answer, ReviewQaChain};
use crate::chunking::Chunker;
use crate::config::{EmbeddingBackend, ReviewRagConfig};
use crate::document::ReviewRecord;
use crate::embedding::{EmbeddingProvider, HashingEmbeddingProvider};
use crate::error::{ReviewRagError, Result};
use crate::generation::TextGenerator;
use crate::loader::{InputFormat, ReviewLoader};
use crate::ollama::{OllamaEmbeddingProvider, OllamaGenerator};
use crate::persistent::PersistentVectorStore;
use crate::preprocess::ReviewPreprocessor;
use crate::prompts::Mode;
use crate::retriever::ReviewRetriever;
use crate::store::ReviewVectorStore;
use crate::vectorstore::VectorStore;

/// Outcome of an indexing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    /// Reviews that survived cleaning.
    pub reviews: usize,
    /// Chunks written to the index.
    pub chunks: usize,
}

/// Loads, indexes and answers questions about product reviews.
pub struct ReviewRagService {
    config: ReviewRagConfig,
    loader: ReviewLoader,
    preprocessor: ReviewPreprocessor,
    store: Arc<ReviewVectorStore>,
    chain: ReviewQaChain,
    // Index and reset replace the whole collection; run them one at a time.
    write_lock: Mutex<()>,
}

impl ReviewRagService {
    /// Create a new [`ReviewRagServiceBuilder`].
    pub fn builder() -> ReviewRagServiceBuilder {
        ReviewRagServiceBuilder::default()
    }

    /// Build the service from configuration: the configured embedder, a
    /// persistent collection under `vector_store_path`, and an Ollama generator.
    ///
    /// # Errors
    ///
    /// Fails if the collection cannot be opened or an HTTP client cannot be built.
    pub async fn from_config(config: ReviewRagConfig) -> Result<Self> {
        let embedder: Arc<dyn EmbeddingProvider> = match config.embedding_backend {
            EmbeddingBackend::Hashing => {
                Arc::new(HashingEmbeddingProvider::new(config.embedding_dimensions))
            }
            EmbeddingBackend::Ollama => Arc::new(OllamaEmbeddingProvider::new(
                &config.ollama_base_url,
                &config.embedding_model,
                config.embedding_dimensions,
                config.request_timeout(),
            )?),
        };
        let backend =
            PersistentVectorStore::open(&config.vector_store_path, &config.collection_name).await?;
        let generator = OllamaGenerator::new(
            &config.ollama_base_url,
            &config.generation_model,
            config.request_timeout(),
        )?;

        info!(
            embedder = embedder.name(),
            generation_model = %config.generation_model,
            collection = %config.collection_name,
            "review RAG service ready"
        );

        Self::builder()
            .config(config)
            .embedding_provider(embedder)
            .vector_store(Arc::new(backend))
            .generator(Arc::new(generator))
            .build()
    }

    /// The configuration the service was built with.
    pub fn config(&self) -> &ReviewRagConfig {
        &self.config
    }

    /// The loader rooted at the configured raw-data directory.
    pub fn loader(&self) -> &ReviewLoader {
        &self.loader
    }

    /// The vector store.
    pub fn store(&self) -> &Arc<ReviewVectorStore> {
        &self.store
    }

    /// Clean and chunk `records`, then replace the index with the result.
    ///
    /// The previous index is discarded even when nothing survives cleaning.
    pub async fn index_records(&self, records: Vec<ReviewRecord>) -> Result<IndexSummary> {
        let _guard = self.write_lock.lock().await;

        let cleaned = self.preprocessor.clean(records);
        let documents = self.preprocessor.to_documents(&cleaned);
        if documents.is_empty() {
            warn!("no usable reviews after cleaning");
        }

        self.store.reset().await?;
        self.store.add_documents(&documents).await?;

        let summary = IndexSummary { reviews: cleaned.len(), chunks: documents.len() };
        info!(reviews = summary.reviews, chunks = summary.chunks, "index rebuilt");
        Ok(summary)
    }

    /// Load a `.csv` or `.json` file from disk and index it.
    ///
    /// # Errors
    ///
    /// [`ReviewRagError::UnsupportedFormat`] is returned before the file is read.
    pub async fn index_file(&self, path: impl AsRef<Path>) -> Result<IndexSummary> {
        let path = path.as_ref();
        InputFormat::from_path(path)?;
        let bytes = tokio::fs::read(path).await?;
        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let records = self.loader.load_bytes(filename, &bytes)?;
        self.index_records(records).await
    }

    /// Index uploaded file content; `filename` selects the format.
    pub async fn index_bytes(&self, filename: &str, bytes: &[u8]) -> Result<IndexSummary> {
        let records = self.loader.load_bytes(filename, bytes)?;
        self.index_records(records).await
    }

    /// Answer `question` from the indexed reviews.
    ///
    /// # Errors
    ///
    /// [`ReviewRagError::EmptyIndex`] when nothing has been indexed; the
    /// generator is not called in that case.
    pub async fn ask(&self, question: &str, mode: Mode, min_rating: Option<f64>) -> Result<Answer> {
        if self.store.count().await? == 0 {
            return Err(ReviewRagError::EmptyIndex);
        }
        self.chain.run(question, mode, min_rating).await
    }

    /// Like [`ask`](Self::ask), with the mode given by name.
    pub async fn ask_str(
        &self,
        question: &str,
        mode: &str,
        min_rating: Option<f64>,
    ) -> Result<Answer> {
        let mode: Mode = mode.parse()?;
        self.ask(question, mode, min_rating).await
    }

    /// Number of indexed chunks.
    pub async fn count(&self) -> Result<usize> {
        self.store.count().await
    }

    /// Discard the index.
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.reset().await
    }
}

/// Builder for a [`ReviewRagService`] from explicit components.
///
/// `config`, `embedding_provider`, `vector_store` and `generator` are
/// required; `chunker` defaults to the recursive splitter sized by `config`.
///
/// # Example
///
/// ```rust,ignore
/// let service = ReviewRagService::builder()
///     .config(ReviewRagConfig::default())
///     .embedding_provider(Arc::new(HashingEmbeddingProvider::new(256)))
///     .vector_store(Arc::new(InMemoryVectorStore::new()))
///     .generator(Arc::new(my_generator))
///     .build()?;
/// ```
#[derive(Default)]
pub struct ReviewRagServiceBuilder {
    config: Option<ReviewRagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    generator: Option<Arc<dyn TextGenerator>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl ReviewRagServiceBuilder {
    /// Set the configuration.
    pub fn config(mut self, config: ReviewRagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the text generator.
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Override the text splitter.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the service.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewRagError::ConfigError`] if a required component is missing.
    pub fn build(self) -> Result<ReviewRagService> {
        let config = self
            .config
            .ok_or_else(|| ReviewRagError::ConfigError("config is required".to_string()))?;
        let embedder = self.embedding_provider.ok_or_else(|| {
            ReviewRagError::ConfigError("embedding_provider is required".to_string())
        })?;
        let backend = self
            .vector_store
            .ok_or_else(|| ReviewRagError::ConfigError("vector_store is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| ReviewRagError::ConfigError("generator is required".to_string()))?;

        let mut preprocessor = ReviewPreprocessor::from_config(&config);
        if let Some(chunker) = self.chunker {
            preprocessor = preprocessor.with_chunker(chunker);
        }

        let loader = ReviewLoader::new(config.raw_data_path.clone()).with_columns(config.columns.clone());
        let store = Arc::new(ReviewVectorStore::new(embedder, backend));
        let retriever = ReviewRetriever::new(Arc::clone(&store), config.max_results);
        let chain = ReviewQaChain::new(retriever, generator);

        Ok(ReviewRagService {
            config,
            loader,
            preprocessor,
            store,
            chain,
            write_lock: Mutex::new(()),
        })
    }
}
