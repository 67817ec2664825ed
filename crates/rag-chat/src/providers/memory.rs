//! Process-local stores for development and tests

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::Result;
use crate::retrieval::MetadataFilter;
use crate::types::{ChatHistoryRecord, Document, ScoredDocument};

use super::history_store::HistoryStore;
use super::vector_store::VectorStoreProvider;

/// Vector store scanning all documents with cosine similarity
///
/// Filters are evaluated here, so it enforces the same user scoping as the
/// Atlas index.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryVectorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Check if store is empty
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Snapshot of all stored documents
    pub fn documents(&self) -> Vec<Document> {
        self.documents.read().clone()
    }
}

/// Cosine similarity; 0.0 when the dimensions differ or either vector has
/// zero magnitude
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStoreProvider for InMemoryVectorStore {
    async fn add_document(&self, document: &Document) -> Result<()> {
        self.documents.write().push(document.clone());
        Ok(())
    }

    async fn add_documents(&self, documents: &[Document]) -> Result<()> {
        self.documents.write().extend_from_slice(documents);
        Ok(())
    }

    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<ScoredDocument>> {
        let documents = self.documents.read();

        let mut scored: Vec<ScoredDocument> = documents
            .iter()
            .filter(|d| filter.matches(&d.metadata))
            .map(|d| ScoredDocument {
                text: d.text.clone(),
                metadata: d.metadata.clone(),
                score: cosine_similarity(query_embedding, &d.embedding) as f64,
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        Ok(scored)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

/// History store keeping records in a list
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: RwLock<Vec<ChatHistoryRecord>>,
}

impl InMemoryHistoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records in insertion order
    pub fn records(&self) -> Vec<ChatHistoryRecord> {
        self.records.read().clone()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, record: &ChatHistoryRecord) -> Result<()> {
        self.records.write().push(record.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
