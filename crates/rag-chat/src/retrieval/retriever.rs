//! Per-request retriever bound to one metadata filter

use std::sync::Arc;

use crate::error::Result;
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::ScoredDocument;

use super::filter::MetadataFilter;

/// Embeds a query and searches the vector store under a fixed filter
///
/// Built fresh for every request so the filter is never shared between users.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    filter: MetadataFilter,
    k: usize,
}

impl Retriever {
    /// Create a retriever returning up to `k` documents matching `filter`
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        filter: MetadataFilter,
        k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            filter,
            k,
        }
    }

    /// Filter applied to every search
    pub fn filter(&self) -> &MetadataFilter {
        &self.filter
    }

    /// Documents most similar to `query` within the filter
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredDocument>> {
        let query_embedding = self.embedder.embed_query(query).await?;

        tracing::debug!(
            "Searching {} (k={}, filter={})",
            self.store.name(),
            self.k,
            self.filter.to_json()
        );

        self.store
            .similarity_search(&query_embedding, self.k, &self.filter)
            .await
    }
}
