//! Provider abstractions for embeddings, chat models, vector storage and chat history
//!
//! Hosted providers (Cohere, OpenAI-compatible) and MongoDB Atlas back the
//! production service; the in-memory stores back local runs and tests.

pub mod cohere;
pub mod embedding;
pub mod history_store;
pub mod llm;
pub mod memory;
pub mod mongo;
pub mod openai;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use history_store::HistoryStore;
pub use llm::LlmProvider;
pub use vector_store::VectorStoreProvider;

use reqwest::Client;
use std::time::Duration;

use crate::error::Result;

/// Shared HTTP client settings for hosted providers
pub(crate) fn http_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_max_idle_per_host(5)
        .build()?;
    Ok(client)
}
