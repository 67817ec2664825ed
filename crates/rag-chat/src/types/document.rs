//! Stored documents and the ingestion request

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Per-document metadata; `userId` scopes retrieval
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Owner of the document
    #[serde(default)]
    pub user_id: String,
    /// Optional topic label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl DocumentMetadata {
    /// Metadata owned by `user_id`, stamped with the current time
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            topic: None,
            created_at: Some(Utc::now()),
        }
    }

    /// Set the topic
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}

/// A text with its embedding, as stored in the documents collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Text content
    pub text: String,
    /// Embedding vector
    pub embedding: Vec<f32>,
    /// Metadata
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a document
    pub fn new(text: impl Into<String>, embedding: Vec<f32>, metadata: DocumentMetadata) -> Self {
        Self {
            text: text.into(),
            embedding,
            metadata,
        }
    }
}

/// A document returned by similarity search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredDocument {
    /// Text content
    pub text: String,
    /// Metadata
    #[serde(default)]
    pub metadata: DocumentMetadata,
    /// Store-reported similarity, higher is closer
    #[serde(default)]
    pub score: f64,
}

/// Body of `POST /ingest`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Text to store
    #[serde(default)]
    pub text: Option<String>,
    /// Owner of the document
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
    /// Optional topic label
    #[serde(default)]
    pub topic: Option<String>,
}

impl IngestRequest {
    /// Return `(text, user_id)` or a validation error
    ///
    /// Text is trimmed; the owner is kept exactly as sent.
    pub fn validate(&self) -> Result<(String, String)> {
        let text = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty());
        let user_id = self.user_id.as_deref().filter(|u| !u.is_empty());

        match (text, user_id) {
            (Some(text), Some(user_id)) => Ok((text.to_string(), user_id.to_string())),
            _ => Err(Error::validation("Missing text or userId")),
        }
    }
}

/// Response of `POST /ingest`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Always `"stored"`
    pub status: String,
    /// Owner of the stored document
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_layout() {
        let doc = Document::new(
            "breathing exercises",
            vec![0.1, 0.2],
            DocumentMetadata::for_user("u1").with_topic("chat"),
        );
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["text"], "breathing exercises");
        assert_eq!(value["embedding"].as_array().unwrap().len(), 2);
        assert_eq!(value["metadata"]["userId"], "u1");
        assert_eq!(value["metadata"]["topic"], "chat");
        assert!(value["metadata"]["createdAt"].is_string());
    }

    #[test]
    fn test_scored_document_tolerates_sparse_metadata() {
        let doc: ScoredDocument =
            serde_json::from_value(json!({"text": "t", "metadata": {"userId": "u1"}, "score": 0.8}))
                .unwrap();
        assert_eq!(doc.metadata.user_id, "u1");
        assert!(doc.metadata.topic.is_none());

        let doc: ScoredDocument = serde_json::from_value(json!({"text": "t"})).unwrap();
        assert_eq!(doc.metadata.user_id, "");
    }

    #[test]
    fn test_ingest_validation() {
        let ok = IngestRequest {
            text: Some(" note ".to_string()),
            user_id: Some(" u1 ".to_string()),
            topic: None,
        };
        assert_eq!(ok.validate().unwrap(), ("note".to_string(), " u1 ".to_string()));

        let missing_user = IngestRequest {
            text: Some("note".to_string()),
            ..Default::default()
        };
        assert!(missing_user.validate().unwrap_err().is_validation());
    }
}
