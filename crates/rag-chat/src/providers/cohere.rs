//! Cohere v2 clients for embeddings and chat
//!
//! Queries and stored documents are embedded with different `input_type`
//! values, as embed-english-v3.0 expects.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::http_client;
use super::llm::LlmProvider;

const DEFAULT_BASE_URL: &str = "https://api.cohere.com";

/// Cohere accepts at most 96 texts per embed call
const MAX_EMBED_BATCH: usize = 96;

/// Cohere embedding provider
pub struct CohereEmbedder {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    dimensions: usize,
}

impl CohereEmbedder {
    /// Create a new Cohere embedder
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("Cohere API key is not set".to_string()))?;

        Ok(Self {
            client: http_client(config.timeout_secs)?,
            api_key,
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            dimensions: config.dimensions,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v2/embed", self.base_url.trim_end_matches('/'))
    }

    async fn embed_with(&self, texts: &[String], input_type: &'static str) -> Result<Vec<Vec<f32>>> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(MAX_EMBED_BATCH) {
            let request = EmbedRequest {
                model: &self.model,
                texts: batch,
                input_type,
                embedding_types: &["float"],
            };

            let response = self
                .client
                .post(self.endpoint())
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::Embedding(format!("Cohere request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Embedding(format!(
                    "Cohere embedding failed ({}): {}",
                    status, body
                )));
            }

            let embed_response: EmbedResponse = response
                .json()
                .await
                .map_err(|e| Error::Embedding(format!("Failed to parse Cohere response: {}", e)))?;

            if embed_response.embeddings.float.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "Cohere returned {} embeddings for {} texts",
                    embed_response.embeddings.float.len(),
                    batch.len()
                )));
            }
            all_embeddings.extend(embed_response.embeddings.float);
        }

        Ok(all_embeddings)
    }
}

#[derive(serde::Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: &'a [String],
    input_type: &'static str,
    embedding_types: &'static [&'static str],
}

#[derive(serde::Deserialize)]
struct EmbedResponse {
    embeddings: EmbeddingsByType,
}

#[derive(serde::Deserialize)]
struct EmbeddingsByType {
    #[serde(default)]
    float: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for CohereEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_with(&[text.to_string()], "search_query")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("No embedding in Cohere response".to_string()))
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.embed_with(texts, "search_document").await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.api_key.is_empty())
    }

    fn name(&self) -> &str {
        "cohere"
    }
}

/// Cohere chat model client
pub struct CohereChat {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
}

impl CohereChat {
    /// Create a new Cohere chat client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("Cohere API key is not set".to_string()))?;

        Ok(Self {
            client: http_client(config.timeout_secs)?,
            api_key,
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v2/chat", self.base_url.trim_end_matches('/'))
    }
}

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(serde::Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(serde::Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Vec<ContentItem>,
}

#[derive(serde::Deserialize)]
struct ContentItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl ChatResponse {
    fn into_text(self) -> Result<String> {
        let text: Vec<String> = self
            .message
            .content
            .into_iter()
            .filter(|item| item.kind == "text")
            .map(|item| item.text)
            .collect();

        if text.is_empty() {
            return Err(Error::Llm("No text in Cohere response".to_string()));
        }
        Ok(text.concat())
    }
}

#[async_trait]
impl LlmProvider for CohereChat {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("Cohere request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!(
                "Cohere generation failed ({}): {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("Failed to parse Cohere response: {}", e)))?;

        chat_response.into_text()
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.api_key.is_empty())
    }

    fn name(&self) -> &str {
        "cohere"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embed_request_shape() {
        let texts = vec!["how to sleep better".to_string()];
        let request = EmbedRequest {
            model: "embed-english-v3.0",
            texts: &texts,
            input_type: "search_query",
            embedding_types: &["float"],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "embed-english-v3.0",
                "texts": ["how to sleep better"],
                "input_type": "search_query",
                "embedding_types": ["float"]
            })
        );
    }

    #[test]
    fn test_parse_embed_response() {
        let response: EmbedResponse = serde_json::from_value(json!({
            "id": "abc",
            "embeddings": {"float": [[0.1, 0.2, 0.3]]},
            "texts": ["x"]
        }))
        .unwrap();
        assert_eq!(response.embeddings.float, vec![vec![0.1, 0.2, 0.3]]);
    }

    #[test]
    fn test_parse_chat_response() {
        let response: ChatResponse = serde_json::from_value(json!({
            "id": "abc",
            "finish_reason": "COMPLETE",
            "message": {
                "role": "assistant",
                "content": [{"type": "text", "text": "Try box breathing."}]
            }
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "Try box breathing.");
    }

    #[test]
    fn test_chat_response_without_text_is_error() {
        let response: ChatResponse = serde_json::from_value(json!({
            "message": {"role": "assistant", "content": []}
        }))
        .unwrap();
        assert!(matches!(response.into_text(), Err(Error::Llm(_))));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let config = EmbeddingConfig::default();
        assert!(matches!(CohereEmbedder::new(&config), Err(Error::Config(_))));
    }
}
