//! Metadata equality filters evaluated by the vector store

use mongodb::bson::{Bson, Document as BsonDocument};

use crate::types::DocumentMetadata;

/// Metadata path holding the document owner
pub const USER_ID_PATH: &str = "metadata.userId";

/// Equality predicate on one metadata path
///
/// Serialises to `{"<path>": {"$eq": <value>}}`. A `None` value compares
/// against null, which matches no owned document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFilter {
    path: String,
    equals: Option<String>,
}

impl MetadataFilter {
    /// Filter on an arbitrary metadata path
    pub fn eq(path: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            path: path.into(),
            equals: value.map(str::to_string),
        }
    }

    /// Filter restricting retrieval to one user's documents
    pub fn user_scope(user_id: Option<&str>) -> Self {
        Self::eq(USER_ID_PATH, user_id)
    }

    /// Dotted path being compared
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Value being compared against
    pub fn value(&self) -> Option<&str> {
        self.equals.as_deref()
    }

    /// Filter document for the `$vectorSearch` stage
    pub fn to_document(&self) -> BsonDocument {
        let value = match &self.equals {
            Some(v) => Bson::String(v.clone()),
            None => Bson::Null,
        };

        let mut condition = BsonDocument::new();
        condition.insert("$eq", value);

        let mut filter = BsonDocument::new();
        filter.insert(self.path.clone(), condition);
        filter
    }

    /// Same filter as JSON, for logs and assertions
    pub fn to_json(&self) -> serde_json::Value {
        let mut filter = serde_json::Map::new();
        filter.insert(
            self.path.clone(),
            serde_json::json!({ "$eq": self.equals }),
        );
        serde_json::Value::Object(filter)
    }

    /// Evaluate the filter against metadata held locally
    pub fn matches(&self, metadata: &DocumentMetadata) -> bool {
        let field = match self.path.strip_prefix("metadata.") {
            Some("userId") => Some(metadata.user_id.as_str()).filter(|u| !u.is_empty()),
            Some("topic") => metadata.topic.as_deref(),
            _ => return false,
        };
        field == self.equals.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use serde_json::json;

    #[test]
    fn test_user_scope_document() {
        let filter = MetadataFilter::user_scope(Some("user-42"));
        assert_eq!(
            filter.to_document(),
            doc! { "metadata.userId": { "$eq": "user-42" } }
        );
        assert_eq!(
            filter.to_json(),
            json!({"metadata.userId": {"$eq": "user-42"}})
        );
    }

    #[test]
    fn test_missing_user_compares_to_null() {
        let filter = MetadataFilter::user_scope(None);
        assert_eq!(
            filter.to_document(),
            doc! { "metadata.userId": { "$eq": Bson::Null } }
        );
        assert_eq!(filter.to_json(), json!({"metadata.userId": {"$eq": null}}));
    }

    #[test]
    fn test_matches_owner_only() {
        let filter = MetadataFilter::user_scope(Some("alice"));
        assert!(filter.matches(&DocumentMetadata::for_user("alice")));
        assert!(!filter.matches(&DocumentMetadata::for_user("bob")));
        assert!(!filter.matches(&DocumentMetadata::default()));

        let anonymous = MetadataFilter::user_scope(None);
        assert!(anonymous.matches(&DocumentMetadata::default()));
        assert!(!anonymous.matches(&DocumentMetadata::for_user("alice")));
    }

    #[test]
    fn test_topic_filter() {
        let filter = MetadataFilter::eq("metadata.topic", Some("sleep"));
        let meta = DocumentMetadata::for_user("alice").with_topic("sleep");
        assert!(filter.matches(&meta));
        assert!(!MetadataFilter::eq("metadata.unknown", Some("x")).matches(&meta));
    }
}
