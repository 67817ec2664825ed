//! Retrieval-QA pipeline: retrieve under a filter, stuff the context, generate

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::providers::{EmbeddingProvider, LlmProvider, VectorStoreProvider};
use crate::retrieval::{MetadataFilter, Retriever};
use crate::types::ScoredDocument;

use super::prompt::PromptBuilder;

/// Output of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct QaOutput {
    /// Generated answer
    pub result: String,
    /// Documents the answer was conditioned on
    pub source_documents: Vec<ScoredDocument>,
}

/// Question answering over a user-scoped document set
#[async_trait]
pub trait QaPipeline: Send + Sync {
    /// Answer `query` using only documents matching `filter`
    async fn invoke(&self, query: &str, filter: &MetadataFilter) -> Result<QaOutput>;
}

/// Embedding + vector search + hosted chat model
pub struct RetrievalQa {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
}

impl RetrievalQa {
    /// Create a pipeline retrieving `top_k` documents per question
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        llm: Arc<dyn LlmProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            llm,
            top_k,
        }
    }

    /// Retriever bound to `filter`
    pub fn retriever(&self, filter: MetadataFilter) -> Retriever {
        Retriever::new(
            Arc::clone(&self.embedder),
            Arc::clone(&self.store),
            filter,
            self.top_k,
        )
    }
}

#[async_trait]
impl QaPipeline for RetrievalQa {
    async fn invoke(&self, query: &str, filter: &MetadataFilter) -> Result<QaOutput> {
        let retriever = self.retriever(filter.clone());
        let documents = retriever.retrieve(query).await?;

        tracing::debug!(
            "Retrieved {} documents, generating with {} ({})",
            documents.len(),
            self.llm.name(),
            self.llm.model()
        );

        let context = PromptBuilder::build_context(&documents);
        let prompt = PromptBuilder::build_qa_prompt(query, &context);
        let result = self.llm.generate(&prompt).await?;

        Ok(QaOutput {
            result: result.trim().to_string(),
            source_documents: documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::memory::InMemoryVectorStore;
    use crate::types::{Document, DocumentMetadata};
    use parking_lot::Mutex;

    /// Embeds every text as [1.0, len]
    struct LengthEmbedder;

    #[async_trait]
    impl EmbeddingProvider for LengthEmbedder {
        async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, text.len() as f32])
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "length"
        }
    }

    struct RecordingLlm {
        prompts: Mutex<Vec<String>>,
        reply: Option<String>,
    }

    #[async_trait]
    impl LlmProvider for RecordingLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().push(prompt.to_string());
            self.reply
                .clone()
                .ok_or_else(|| Error::llm("model unavailable"))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "recording"
        }

        fn model(&self) -> &str {
            "test"
        }
    }

    async fn store_with_two_users() -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new());
        store
            .add_documents(&[
                Document::new("alice likes yoga", vec![1.0, 0.0], DocumentMetadata::for_user("alice")),
                Document::new("bob likes running", vec![1.0, 0.0], DocumentMetadata::for_user("bob")),
            ])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_answer_uses_only_scoped_documents() {
        let store = store_with_two_users().await;
        let llm = Arc::new(RecordingLlm {
            prompts: Mutex::new(Vec::new()),
            reply: Some("  Yoga.  ".to_string()),
        });
        let qa = RetrievalQa::new(Arc::new(LengthEmbedder), store, llm.clone(), 4);

        let output = qa
            .invoke("what helps?", &MetadataFilter::user_scope(Some("alice")))
            .await
            .unwrap();

        assert_eq!(output.result, "Yoga.");
        assert_eq!(output.source_documents.len(), 1);
        assert_eq!(output.source_documents[0].metadata.user_id, "alice");

        let prompts = llm.prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("alice likes yoga"));
        assert!(!prompts[0].contains("bob likes running"));
        assert!(prompts[0].contains("Question: what helps?"));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let store = store_with_two_users().await;
        let llm = Arc::new(RecordingLlm {
            prompts: Mutex::new(Vec::new()),
            reply: None,
        });
        let qa = RetrievalQa::new(Arc::new(LengthEmbedder), store, llm, 4);

        let err = qa
            .invoke("what helps?", &MetadataFilter::user_scope(Some("alice")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
    }

    #[test]
    fn test_retriever_keeps_filter() {
        let qa = RetrievalQa::new(
            Arc::new(LengthEmbedder),
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(RecordingLlm {
                prompts: Mutex::new(Vec::new()),
                reply: None,
            }),
            4,
        );
        let retriever = qa.retriever(MetadataFilter::user_scope(Some("carol")));
        assert_eq!(retriever.filter().value(), Some("carol"));
    }
}
