//! The answer chain: retrieve → format → fill prompt → generate.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::document::Document;
use crate::error::Result;
use crate::generation::TextGenerator;
use crate::prompts::Mode;
use crate::retriever::ReviewRetriever;

/// A generated answer together with the reviews it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    /// The model's reply, whitespace-trimmed.
    pub answer: String,
    /// The retrieved chunks, in the order they appeared in the prompt.
    pub sources: Vec<Document>,
}

/// Answers questions about a product from its indexed reviews.
#[derive(Clone)]
pub struct ReviewQaChain {
    retriever: ReviewRetriever,
    generator: Arc<dyn TextGenerator>,
}

impl ReviewQaChain {
    /// Compose a retriever with a text generator.
    pub fn new(retriever: ReviewRetriever, generator: Arc<dyn TextGenerator>) -> Self {
        Self { retriever, generator }
    }

    /// The retriever used to gather context.
    pub fn retriever(&self) -> &ReviewRetriever {
        &self.retriever
    }

    /// Answer `question` in the given `mode`.
    ///
    /// # Errors
    ///
    /// Propagates retrieval and generation failures unchanged.
    pub async fn run(&self, question: &str, mode: Mode, min_rating: Option<f64>) -> Result<Answer> {
        let sources = self.retriever.retrieve(question, min_rating).await?;
        let context = self.retriever.format_context(&sources);
        let prompt = mode.template().render(&context, question);

        let raw = self.generator.generate(&prompt).await.inspect_err(|e| {
            error!(generator = self.generator.name(), error = %e, "generation failed");
        })?;

        info!(mode = %mode, source_count = sources.len(), "answered question");
        Ok(Answer { answer: raw.trim().to_string(), sources })
    }

    /// Like [`run`](Self::run), parsing `mode` first.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewRagError::UnknownMode`](crate::ReviewRagError::UnknownMode)
    /// before any retrieval happens when `mode` is not a supported mode.
    pub async fn run_str(
        &self,
        question: &str,
        mode: &str,
        min_rating: Option<f64>,
    ) -> Result<Answer> {
        let mode: Mode = mode.parse()?;
        self.run(question, mode, min_rating).await
    }
}
