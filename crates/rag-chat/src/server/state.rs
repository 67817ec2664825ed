//! Application state for the chat server

use std::sync::Arc;

use crate::config::{ChatConfig, ProviderKind, StoreBackend};
use crate::error::Result;
use crate::generation::{QaPipeline, RetrievalQa};
use crate::providers::{
    cohere::{CohereChat, CohereEmbedder},
    memory::{InMemoryHistoryStore, InMemoryVectorStore},
    mongo::MongoStores,
    openai::{OpenAiChat, OpenAiEmbedder},
    EmbeddingProvider, HistoryStore, LlmProvider, VectorStoreProvider,
};
use crate::types::{ChatHistoryRecord, ChatMode, Document, DocumentMetadata};

/// Topic stamped on documents created from chat exchanges
pub const CHAT_TOPIC: &str = "chat";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ChatConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    vector_store: Arc<dyn VectorStoreProvider>,
    history_store: Arc<dyn HistoryStore>,
    pipeline: Arc<dyn QaPipeline>,
}

impl AppState {
    /// Create state with providers selected by the configuration
    pub async fn new(config: ChatConfig) -> Result<Self> {
        tracing::info!(
            "Initializing chat state (mode: {}, store: {:?})",
            config.chat.mode,
            config.store
        );

        let embedder: Arc<dyn EmbeddingProvider> = match config.embeddings.provider {
            ProviderKind::Cohere => Arc::new(CohereEmbedder::new(&config.embeddings)?),
            ProviderKind::OpenAi => Arc::new(OpenAiEmbedder::new(&config.embeddings)?),
        };

        let llm: Arc<dyn LlmProvider> = match config.llm.provider {
            ProviderKind::Cohere => Arc::new(CohereChat::new(&config.llm)?),
            ProviderKind::OpenAi => Arc::new(OpenAiChat::new(&config.llm)?),
        };

        let (vector_store, history_store): (Arc<dyn VectorStoreProvider>, Arc<dyn HistoryStore>) =
            match config.store {
                StoreBackend::Mongo => {
                    let stores = MongoStores::connect(&config.mongo).await?;
                    (Arc::new(stores.vector_store), Arc::new(stores.history_store))
                }
                StoreBackend::Memory => {
                    tracing::warn!("Using in-memory stores; data is lost on restart");
                    (
                        Arc::new(InMemoryVectorStore::new()),
                        Arc::new(InMemoryHistoryStore::new()),
                    )
                }
            };

        tracing::info!(
            "Providers initialized (embeddings: {} {}, llm: {} {}, store: {})",
            embedder.name(),
            config.embeddings.model,
            llm.name(),
            llm.model(),
            vector_store.name()
        );

        let pipeline: Arc<dyn QaPipeline> = Arc::new(RetrievalQa::new(
            Arc::clone(&embedder),
            Arc::clone(&vector_store),
            Arc::clone(&llm),
            config.chat.top_k,
        ));

        Ok(Self::from_parts(
            config,
            embedder,
            llm,
            vector_store,
            history_store,
            pipeline,
        ))
    }

    /// Create state from already constructed providers
    pub fn from_parts(
        config: ChatConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        vector_store: Arc<dyn VectorStoreProvider>,
        history_store: Arc<dyn HistoryStore>,
        pipeline: Arc<dyn QaPipeline>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                embedder,
                llm,
                vector_store,
                history_store,
                pipeline,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &ChatConfig {
        &self.inner.config
    }

    /// Active chat mode
    pub fn mode(&self) -> ChatMode {
        self.inner.config.chat.mode
    }

    /// Get embedding provider
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get LLM provider
    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    /// Get vector store
    pub fn vector_store(&self) -> &Arc<dyn VectorStoreProvider> {
        &self.inner.vector_store
    }

    /// Get chat history store
    pub fn history_store(&self) -> &Arc<dyn HistoryStore> {
        &self.inner.history_store
    }

    /// Get QA pipeline
    pub fn pipeline(&self) -> &Arc<dyn QaPipeline> {
        &self.inner.pipeline
    }

    /// True when every provider reports healthy
    pub async fn is_ready(&self) -> bool {
        let checks = [
            ("embeddings", self.inner.embedder.health_check().await),
            ("llm", self.inner.llm.health_check().await),
            ("vector store", self.inner.vector_store.health_check().await),
            ("history store", self.inner.history_store.health_check().await),
        ];

        let mut ready = true;
        for (component, check) in checks {
            match check {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!("{} is not ready", component);
                    ready = false;
                }
                Err(e) => {
                    tracing::warn!("{} health check failed: {}", component, e);
                    ready = false;
                }
            }
        }
        ready
    }

    /// Record a completed exchange in the history collection and as a
    /// retrievable document for the same user.
    ///
    /// Both writes are attempted; failures are logged and never returned.
    pub async fn persist_exchange(&self, user_id: &str, query: &str, answer: &str) {
        let record = ChatHistoryRecord::new(user_id, query, answer);
        if let Err(e) = self.inner.history_store.append(&record).await {
            tracing::warn!("Failed to save chat history for {}: {}", user_id, e);
        }

        if let Err(e) = self.store_exchange_document(user_id, query, answer).await {
            tracing::warn!("Failed to store chat exchange for {}: {}", user_id, e);
        }
    }

    async fn store_exchange_document(&self, user_id: &str, query: &str, answer: &str) -> Result<()> {
        let text = exchange_text(query, answer);
        let embedding = self
            .inner
            .embedder
            .embed_documents(std::slice::from_ref(&text))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| crate::error::Error::embedding("No embedding returned for exchange"))?;

        let document = Document::new(
            text,
            embedding,
            DocumentMetadata::for_user(user_id).with_topic(CHAT_TOPIC),
        );
        self.inner.vector_store.add_document(&document).await
    }
}

/// Text stored for a chat exchange
pub fn exchange_text(query: &str, answer: &str) -> String {
    format!("User: {}\nAssistant: {}", query, answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_text() {
        assert_eq!(
            exchange_text("I can't sleep", "Try a wind-down routine."),
            "User: I can't sleep\nAssistant: Try a wind-down routine."
        );
    }
}
