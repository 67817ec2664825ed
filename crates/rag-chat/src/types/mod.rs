//! Core types for the chat backend

pub mod chat;
pub mod document;

pub use chat::{ChatHistoryRecord, ChatMode, ChatReply, ChatRequest, ChatResponse, ValidatedChat};
pub use document::{Document, DocumentMetadata, IngestRequest, IngestResponse, ScoredDocument};
