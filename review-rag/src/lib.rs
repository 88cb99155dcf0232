//! Retrieval-augmented question answering over product reviews.
//!
//! The pipeline loads review files, cleans and chunks them, embeds the chunks
//! into a cosine-distance vector index, and answers questions by retrieving
//! the most similar chunks and handing them to a language model as context.
//!
//! ```text
//! ReviewLoader → ReviewPreprocessor → ReviewVectorStore
//!                                          ↓
//!             question → ReviewRetriever → ReviewQaChain → Answer
//! ```
//!
//! [`ReviewRagService`] wires all of it together from a [`ReviewRagConfig`].
//!
//! # Example
//!
//! ```rust,ignore
//! use review_rag::{Mode, ReviewRagConfig, ReviewRagService};
//!
//! let config = ReviewRagConfig::from_env()?;
//! let service = ReviewRagService::from_config(config).await?;
//!
//! let summary = service.index_file("data/sample_reviews.json").await?;
//! println!("indexed {} chunks", summary.chunks);
//!
//! let answer = service.ask("Is this good for beginners?", Mode::Qa, Some(4.0)).await?;
//! println!("{}", answer.answer);
//! ```

pub mod chain;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod evaluate;
pub mod generation;
pub mod inmemory;
pub mod loader;
pub mod ollama;
pub mod persistent;
pub mod preprocess;
pub mod prompts;
pub mod retriever;
pub mod service;
pub mod store;
pub mod vectorstore;

pub use chain::{Answer, ReviewQaChain};
pub use chunking::{Chunker, RecursiveChunker};
pub use config::{ColumnMapping, EmbeddingBackend, ReviewRagConfig, ReviewRagConfigBuilder};
pub use document::{ChunkMetadata, Document, IndexedEntry, ReviewRecord};
pub use embedding::{EmbeddingProvider, HashingEmbeddingProvider};
pub use error::{Result, ReviewRagError};
pub use evaluate::{EvalCase, EvalReport, EvalResult, default_eval_set, run_evaluation};
pub use generation::TextGenerator;
pub use inmemory::InMemoryVectorStore;
pub use loader::{InputFormat, ReviewLoader};
pub use ollama::{OllamaEmbeddingProvider, OllamaGenerator};
pub use persistent::PersistentVectorStore;
pub use preprocess::{ReviewPreprocessor, clean_text};
pub use prompts::{Mode, PromptTemplate};
pub use retriever::{ReviewRetriever, format_context};
pub use service::{IndexSummary, ReviewRagService, ReviewRagServiceBuilder};
pub use store::ReviewVectorStore;
pub use vectorstore::VectorStore;
