//! User-scoped retrieval: metadata filters and the per-request retriever

pub mod filter;
pub mod retriever;

pub use filter::{MetadataFilter, USER_ID_PATH};
pub use retriever::Retriever;
