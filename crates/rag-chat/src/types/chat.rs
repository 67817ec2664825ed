//! Chat request/response types and the per-mode reply shape

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Chat handler behaviour
///
/// `Retrieval` answers from stored documents only. `Memory` additionally
/// requires a user id and writes every answered exchange back to the stores.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// `userId` optional, failures reported under `response`
    #[default]
    Retrieval,
    /// `userId` required, failures reported under `error`, exchanges persisted
    Memory,
}

impl ChatMode {
    /// Whether a request without `userId` is rejected
    pub fn requires_user_id(self) -> bool {
        matches!(self, ChatMode::Memory)
    }

    /// Whether answered exchanges are written to history and the vector store
    pub fn persists_exchange(self) -> bool {
        matches!(self, ChatMode::Memory)
    }

    /// Static message for rejected input
    pub fn missing_input_message(self) -> &'static str {
        match self {
            ChatMode::Retrieval => "No message provided",
            ChatMode::Memory => "Missing message or userId",
        }
    }

    fn failure_key(self) -> &'static str {
        match self {
            ChatMode::Retrieval => "response",
            ChatMode::Memory => "error",
        }
    }

    fn failure_message(self, err: &Error) -> String {
        match (self, err) {
            (_, Error::Validation(msg)) => msg.clone(),
            (ChatMode::Retrieval, err) => format!("Filter error: {}", err),
            (ChatMode::Memory, err) => err.to_string(),
        }
    }
}

impl FromStr for ChatMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retrieval" => Ok(ChatMode::Retrieval),
            "memory" | "history" => Ok(ChatMode::Memory),
            other => Err(Error::Config(format!("Unknown chat mode: {}", other))),
        }
    }
}

impl std::fmt::Display for ChatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatMode::Retrieval => write!(f, "retrieval"),
            ChatMode::Memory => write!(f, "memory"),
        }
    }
}

/// Body of `POST /rag_chat`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question
    #[serde(default)]
    pub message: Option<String>,
    /// Owner of the documents to search
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
}

/// A chat request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedChat {
    /// Question text as sent
    pub query: String,
    /// Requesting user, if any
    pub user_id: Option<String>,
}

impl ChatRequest {
    /// Create a request
    pub fn new(message: impl Into<String>, user_id: Option<&str>) -> Self {
        Self {
            message: Some(message.into()),
            user_id: user_id.map(str::to_string),
        }
    }

    /// Check required fields for `mode`
    ///
    /// Values are passed through unchanged. Only an absent or empty message
    /// is rejected; in memory mode an absent or empty `userId` is too.
    pub fn validate(&self, mode: ChatMode) -> Result<ValidatedChat> {
        let query = self.message.as_deref().filter(|m| !m.is_empty());
        let user_id = self.user_id.as_deref();

        match (query, user_id) {
            (None, _) => Err(Error::validation(mode.missing_input_message())),
            (Some(_), None | Some("")) if mode.requires_user_id() => {
                Err(Error::validation(mode.missing_input_message()))
            }
            (Some(query), user_id) => Ok(ValidatedChat {
                query: query.to_string(),
                user_id: user_id.map(str::to_string),
            }),
        }
    }
}

/// Successful chat response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    /// Generated answer
    pub response: String,
}

/// Status plus body for `/rag_chat`, shaped according to the chat mode
#[derive(Debug, Clone)]
pub struct ChatReply {
    status: StatusCode,
    body: serde_json::Value,
}

impl ChatReply {
    /// 200 with the answer
    pub fn answer(text: impl Into<String>) -> Self {
        let response: String = text.into();
        Self {
            status: StatusCode::OK,
            body: serde_json::json!({ "response": response }),
        }
    }

    /// 400 for validation errors, 500 for everything else
    pub fn failure(mode: ChatMode, err: &Error) -> Self {
        let status = if err.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let mut body = serde_json::Map::new();
        body.insert(
            mode.failure_key().to_string(),
            serde_json::Value::String(mode.failure_message(err)),
        );

        Self {
            status,
            body: serde_json::Value::Object(body),
        }
    }

    /// HTTP status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// JSON body
    pub fn body(&self) -> &serde_json::Value {
        &self.body
    }
}

impl IntoResponse for ChatReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// One answered exchange, appended to the history collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryRecord {
    /// User who asked
    pub user_id: String,
    /// Question text
    pub query: String,
    /// Generated answer
    pub response: String,
    /// When the answer was produced
    pub created_at: DateTime<Utc>,
}

impl ChatHistoryRecord {
    /// Record an exchange at the current time
    pub fn new(user_id: impl Into<String>, query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            query: query.into(),
            response: response.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let request: ChatRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.message.is_none());
        assert!(request.user_id.is_none());

        let request: ChatRequest =
            serde_json::from_value(json!({"message": null, "userId": "u1"})).unwrap();
        assert!(request.message.is_none());
        assert_eq!(request.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_retrieval_mode_allows_missing_user() {
        let validated = ChatRequest::new("How do I relax?", None)
            .validate(ChatMode::Retrieval)
            .unwrap();
        assert_eq!(validated.query, "How do I relax?");
        assert!(validated.user_id.is_none());
    }

    #[test]
    fn test_values_pass_through_unchanged() {
        let validated = ChatRequest::new(" hi ", Some(" u1 "))
            .validate(ChatMode::Retrieval)
            .unwrap();
        assert_eq!(validated.query, " hi ");
        assert_eq!(validated.user_id.as_deref(), Some(" u1 "));

        let validated = ChatRequest::new("   ", Some("u1"))
            .validate(ChatMode::Retrieval)
            .unwrap();
        assert_eq!(validated.query, "   ");

        let validated = ChatRequest::new("hi", Some(""))
            .validate(ChatMode::Retrieval)
            .unwrap();
        assert_eq!(validated.user_id.as_deref(), Some(""));
    }

    #[test]
    fn test_empty_message_rejected_in_both_modes() {
        let err = ChatRequest::new("", Some("u1"))
            .validate(ChatMode::Retrieval)
            .unwrap_err();
        assert_eq!(err.to_string(), "No message provided");

        let err = ChatRequest::default().validate(ChatMode::Memory).unwrap_err();
        assert_eq!(err.to_string(), "Missing message or userId");
    }

    #[test]
    fn test_memory_mode_requires_user() {
        let err = ChatRequest::new("hello", Some(""))
            .validate(ChatMode::Memory)
            .unwrap_err();
        assert!(err.is_validation());

        let validated = ChatRequest::new("hello", Some("u1"))
            .validate(ChatMode::Memory)
            .unwrap();
        assert_eq!(validated.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_reply_shapes() {
        let ok = ChatReply::answer("Answer text");
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(ok.body(), &json!({"response": "Answer text"}));

        let upstream = Error::llm("quota exceeded");
        let retrieval = ChatReply::failure(ChatMode::Retrieval, &upstream);
        assert_eq!(retrieval.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            retrieval.body(),
            &json!({"response": "Filter error: LLM error: quota exceeded"})
        );

        let memory = ChatReply::failure(ChatMode::Memory, &upstream);
        assert_eq!(memory.body(), &json!({"error": "LLM error: quota exceeded"}));

        let invalid = ChatReply::failure(
            ChatMode::Memory,
            &Error::validation(ChatMode::Memory.missing_input_message()),
        );
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.body(), &json!({"error": "Missing message or userId"}));
    }

    #[test]
    fn test_history_record_field_names() {
        let record = ChatHistoryRecord::new("u1", "q", "a");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["query"], "q");
        assert_eq!(value["response"], "a");
        assert!(value["createdAt"].is_string());
    }
}
