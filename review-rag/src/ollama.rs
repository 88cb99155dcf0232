//! Clients for a locally running Ollama server.
//!
//! [`OllamaEmbeddingProvider`] calls `POST /api/embed`; [`OllamaGenerator`]
//! calls `POST /api/generate` with streaming disabled. Both use `reqwest`
//! directly, never retry, and surface non-2xx responses with the server's
//! error message.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{ReviewRagError, Result};
use crate::generation::TextGenerator;

/// The default Ollama endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

const PROVIDER: &str = "Ollama";

fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| {
        ReviewRagError::ConfigError(format!("failed to build HTTP client for Ollama: {e}"))
    })
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Read the body of a failed response, preferring Ollama's `{"error": ...}` message.
async fn error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);
    format!("API returned {status}: {detail}")
}

// ── Embeddings ─────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by Ollama's `/api/embed` endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use review_rag::ollama::OllamaEmbeddingProvider;
///
/// let provider = OllamaEmbeddingProvider::new("http://localhost:11434", "all-minilm", 384, None)?;
/// let vectors = provider.embed(&["hello", "world"]).await?;
/// ```
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbeddingProvider {
    /// Create a provider for `model` served at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
            model: model.into(),
            dimensions,
        })
    }

    /// The embedding model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

fn embedding_error(message: String) -> ReviewRagError {
    ReviewRagError::EmbeddingError { provider: PROVIDER.to_string(), message }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = PROVIDER, batch_size = texts.len(), model = %self.model, "embedding batch");

        let response = self
            .client
            .post(endpoint(&self.base_url, "api/embed"))
            .json(&EmbedRequest { model: &self.model, input: texts })
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "embedding request failed");
                embedding_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let detail = error_detail(response).await;
            error!(provider = PROVIDER, %detail, "embedding API error");
            return Err(embedding_error(detail));
        }

        let parsed: EmbedResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse embedding response");
            embedding_error(format!("failed to parse response: {e}"))
        })?;

        if parsed.embeddings.len() != texts.len() {
            return Err(embedding_error(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }

        Ok(parsed.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

// ── Generation ─────────────────────────────────────────────────────

/// A [`TextGenerator`] backed by Ollama's `/api/generate` endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use review_rag::ollama::OllamaGenerator;
///
/// let llm = OllamaGenerator::new("http://localhost:11434", "llama3.2", None)?;
/// let text = llm.generate("Say hello").await?;
/// ```
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    /// Create a generator for `model` served at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        Ok(Self { client: build_client(timeout)?, base_url: base_url.into(), model: model.into() })
    }

    /// The generation model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

fn generation_error(message: String) -> ReviewRagError {
    ReviewRagError::GenerationError { provider: PROVIDER.to_string(), message }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.model, prompt_len = prompt.len(), "generating");

        let response = self
            .client
            .post(endpoint(&self.base_url, "api/generate"))
            .json(&GenerateRequest { model: &self.model, prompt, stream: false })
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "generation request failed");
                generation_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let detail = error_detail(response).await;
            error!(provider = PROVIDER, %detail, "generation API error");
            return Err(generation_error(detail));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse generation response");
            generation_error(format!("failed to parse response: {e}"))
        })?;

        Ok(parsed.response)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(endpoint("http://localhost:11434/", "api/embed"), "http://localhost:11434/api/embed");
        assert_eq!(endpoint("http://host:1", "api/generate"), "http://host:1/api/generate");
    }

    #[test]
    fn generate_request_disables_streaming() {
        let body = serde_json::to_value(GenerateRequest { model: "llama3.2", prompt: "hi", stream: false })
            .unwrap();
        assert_eq!(body["stream"], false);
        assert_eq!(body["model"], "llama3.2");
    }

    #[tokio::test]
    async fn unreachable_server_is_an_embedding_error() {
        let provider =
            OllamaEmbeddingProvider::new("http://127.0.0.1:9", "all-minilm", 384, Some(Duration::from_secs(2)))
                .unwrap();
        let err = provider.embed(&["hello"]).await.unwrap_err();
        assert!(matches!(err, ReviewRagError::EmbeddingError { .. }));
        assert!(err.is_external());
    }
}
