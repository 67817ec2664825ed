//! MongoDB Atlas providers: vector search over the documents collection and
//! the chat history collection
//!
//! The Atlas Vector Search index on the documents collection must declare
//! `embedding` as a vector field and `metadata.userId` as a filter field.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document as BsonDocument};
use mongodb::{Client, Collection, Database};

use crate::config::MongoConfig;
use crate::error::{Error, Result};
use crate::retrieval::MetadataFilter;
use crate::types::{ChatHistoryRecord, Document, ScoredDocument};

use super::history_store::HistoryStore;
use super::vector_store::VectorStoreProvider;

/// Vector and history stores sharing one MongoDB client
pub struct MongoStores {
    /// Documents collection with Atlas Vector Search
    pub vector_store: MongoVectorStore,
    /// Chat history collection
    pub history_store: MongoHistoryStore,
}

impl MongoStores {
    /// Connect using the configured URI
    ///
    /// The driver connects lazily; this fails only on a malformed URI.
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let uri = config
            .uri
            .as_deref()
            .ok_or_else(|| Error::Config("MongoDB URI is not set".to_string()))?;

        let client = Client::with_uri_str(uri).await?;
        let database = client.database(&config.database);

        tracing::info!(
            "MongoDB configured (database: {}, documents: {}, history: {})",
            config.database,
            config.documents_collection,
            config.history_collection
        );

        Ok(Self {
            vector_store: MongoVectorStore::new(&database, config),
            history_store: MongoHistoryStore::new(&database, &config.history_collection),
        })
    }
}

/// Documents collection searched with `$vectorSearch`
pub struct MongoVectorStore {
    database: Database,
    collection: Collection<Document>,
    index: String,
    embedding_path: String,
    num_candidates_factor: usize,
}

impl MongoVectorStore {
    /// Create from an open database handle
    pub fn new(database: &Database, config: &MongoConfig) -> Self {
        Self {
            database: database.clone(),
            collection: database.collection(&config.documents_collection),
            index: config.vector_index.clone(),
            embedding_path: config.embedding_path.clone(),
            num_candidates_factor: config.num_candidates_factor.max(1),
        }
    }
}

/// Aggregation pipeline for a filtered vector search
pub fn vector_search_pipeline(
    index: &str,
    embedding_path: &str,
    query_embedding: &[f32],
    k: usize,
    num_candidates_factor: usize,
    filter: &MetadataFilter,
) -> Vec<BsonDocument> {
    let num_candidates = (k * num_candidates_factor) as i64;
    let limit = k as i64;

    vec![
        doc! {
            "$vectorSearch": {
                "index": index,
                "path": embedding_path,
                "queryVector": query_embedding.to_vec(),
                "numCandidates": num_candidates,
                "limit": limit,
                "filter": filter.to_document(),
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "text": 1,
                "metadata.userId": 1,
                "metadata.topic": 1,
                "score": { "$meta": "vectorSearchScore" },
            }
        },
    ]
}

#[async_trait]
impl VectorStoreProvider for MongoVectorStore {
    async fn add_document(&self, document: &Document) -> Result<()> {
        self.collection
            .insert_one(document)
            .await
            .map_err(|e| Error::vector_db(format!("Insert failed: {}", e)))?;
        Ok(())
    }

    async fn add_documents(&self, documents: &[Document]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }
        self.collection
            .insert_many(documents)
            .await
            .map_err(|e| Error::vector_db(format!("Bulk insert failed: {}", e)))?;
        Ok(())
    }

    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<ScoredDocument>> {
        let pipeline = vector_search_pipeline(
            &self.index,
            &self.embedding_path,
            query_embedding,
            k,
            self.num_candidates_factor,
            filter,
        );

        let cursor = self
            .collection
            .aggregate(pipeline)
            .await
            .map_err(|e| Error::vector_db(format!("Vector search failed: {}", e)))?;
        let raw: Vec<BsonDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| Error::vector_db(format!("Vector search cursor failed: {}", e)))?;

        raw.into_iter()
            .map(|d| {
                bson::from_document::<ScoredDocument>(d)
                    .map_err(|e| Error::vector_db(format!("Malformed search result: {}", e)))
            })
            .collect()
    }

    async fn health_check(&self) -> Result<bool> {
        match self.database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("MongoDB ping failed: {}", e);
                Ok(false)
            }
        }
    }

    fn name(&self) -> &str {
        "mongodb-atlas"
    }
}

/// Append-only chat history collection
pub struct MongoHistoryStore {
    database: Database,
    collection: Collection<ChatHistoryRecord>,
}

impl MongoHistoryStore {
    /// Create from an open database handle
    pub fn new(database: &Database, collection: &str) -> Self {
        Self {
            database: database.clone(),
            collection: database.collection(collection),
        }
    }
}

#[async_trait]
impl HistoryStore for MongoHistoryStore {
    async fn append(&self, record: &ChatHistoryRecord) -> Result<()> {
        self.collection
            .insert_one(record)
            .await
            .map_err(|e| Error::History(format!("Insert failed: {}", e)))?;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        match self.database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("MongoDB ping failed: {}", e);
                Ok(false)
            }
        }
    }

    fn name(&self) -> &str {
        "mongodb"
    }
}
