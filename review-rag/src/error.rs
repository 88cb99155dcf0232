//! Error types for the `review-rag` crate.

use thiserror::Error;

/// Errors that can occur while loading, indexing, retrieving or answering.
#[derive(Debug, Error)]
pub enum ReviewRagError {
    /// Required columns are absent from the input data.
    #[error("Missing required fields: {}", .fields.join(", "))]
    MissingFields {
        /// The configured column names that were not found, in configured order.
        fields: Vec<String>,
    },

    /// The input file extension is neither `.csv` nor `.json`.
    #[error("Unsupported file format: '{0}'")]
    UnsupportedFormat(String),

    /// The input file could not be parsed.
    #[error("Failed to parse {format} input: {message}")]
    ParseError {
        /// The format being parsed (`CSV` or `JSON`).
        format: &'static str,
        /// A description of the failure.
        message: String,
    },

    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An answer mode outside the supported set was requested.
    #[error("Unknown mode '{mode}'. Choose from: {}", .valid.join(", "))]
    UnknownMode {
        /// The mode the caller asked for.
        mode: String,
        /// The modes that are accepted.
        valid: Vec<String>,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The text-generation model failed or returned an unusable response.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A question was asked before any review was indexed.
    #[error("No reviews indexed yet. Index reviews before asking questions.")]
    EmptyIndex,

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

impl ReviewRagError {
    /// Whether the error stems from bad caller input rather than a failing dependency.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::MissingFields { .. }
                | Self::UnsupportedFormat(_)
                | Self::ParseError { .. }
                | Self::ConfigError(_)
                | Self::UnknownMode { .. }
        )
    }

    /// Whether the error was raised by an external collaborator (embedder, index, model).
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingError { .. }
                | Self::VectorStoreError { .. }
                | Self::GenerationError { .. }
        )
    }
}

/// A convenience result type for review RAG operations.
pub type Result<T> = std::result::Result<T, ReviewRagError>;
