//! Append-only chat history storage

use async_trait::async_trait;
use crate::error::Result;
use crate::types::ChatHistoryRecord;

/// Trait for persisting answered exchanges
///
/// Implementations:
/// - `MongoHistoryStore`: the `chatHistory` collection
/// - `InMemoryHistoryStore`: process-local list
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append one record; records are never updated
    async fn append(&self, record: &ChatHistoryRecord) -> Result<()>;

    /// Check if the store is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
