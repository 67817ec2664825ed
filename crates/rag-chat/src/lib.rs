//! rag-chat: per-user retrieval-augmented chat backend
//!
//! A single `POST /rag_chat` endpoint embeds the user's message, searches a
//! MongoDB Atlas vector index restricted to that user's documents, and asks a
//! hosted chat model to answer from the retrieved context. In memory mode each
//! answered exchange is written back as history and as a new retrievable
//! document.

pub mod config;
pub mod error;
pub mod generation;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::ChatConfig;
pub use error::{Error, Result};
pub use generation::{QaOutput, QaPipeline, RetrievalQa};
pub use retrieval::MetadataFilter;
pub use server::{state::AppState, ChatServer};
pub use types::{ChatMode, ChatRequest, ChatResponse, Document, DocumentMetadata, ScoredDocument};
