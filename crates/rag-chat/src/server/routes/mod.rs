//! Routes for the chat server

pub mod chat;
pub mod ingest;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Chat and ingestion routes mounted at the root
pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/rag_chat", post(chat::rag_chat))
        .route("/ingest", post(ingest::ingest_document))
}

/// Informational routes mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    Json(serde_json::json!({
        "name": "rag-chat",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Per-user retrieval-augmented chat over MongoDB Atlas Vector Search",
        "mode": state.mode().to_string(),
        "providers": {
            "embeddings": state.embedder().name(),
            "embedding_model": config.embeddings.model,
            "llm": state.llm().name(),
            "llm_model": state.llm().model(),
            "vector_store": state.vector_store().name(),
            "history_store": state.history_store().name(),
        },
        "endpoints": {
            "POST /rag_chat": "Answer a message using the user's documents",
            "POST /ingest": "Embed and store a document for a user",
            "GET /health": "Liveness probe",
            "GET /ready": "Readiness probe (all providers healthy)",
            "GET /api/info": "This document"
        }
    }))
}
