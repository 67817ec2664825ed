//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;
use crate::error::Result;
use crate::retrieval::MetadataFilter;
use crate::types::{Document, ScoredDocument};

/// Trait for vector storage and filtered similarity search
///
/// Implementations:
/// - `MongoVectorStore`: MongoDB Atlas Vector Search
/// - `InMemoryVectorStore`: process-local cosine search
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert a document with its embedding
    async fn add_document(&self, document: &Document) -> Result<()>;

    /// Insert multiple documents
    async fn add_documents(&self, documents: &[Document]) -> Result<()> {
        for document in documents {
            self.add_document(document).await?;
        }
        Ok(())
    }

    /// Return up to `k` documents closest to `query_embedding` that satisfy `filter`
    ///
    /// The filter is evaluated by the store; callers do not re-check results.
    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<ScoredDocument>>;

    /// Check if the store is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
