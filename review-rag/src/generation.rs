//! Text-generation trait implemented by language-model clients.

use async_trait::async_trait;

use crate::error::Result;

/// A language model that completes a filled-in prompt.
///
/// Calls block (asynchronously) until the model answers; implementations do
/// not retry. A timeout, if any, is the implementation's own configuration.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Short provider name used in logs and errors.
    fn name(&self) -> &str;
}
