//! LLM provider trait for generating answers

use async_trait::async_trait;
use crate::error::Result;

/// Trait for hosted chat-model completion
///
/// Implementations:
/// - `CohereChat`: Cohere chat v2 (command-r)
/// - `OpenAiChat`: OpenAI-compatible `/chat/completions`
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a single-turn prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is usable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
