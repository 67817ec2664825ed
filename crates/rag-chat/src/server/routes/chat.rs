//! Chat endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::retrieval::MetadataFilter;
use crate::server::state::AppState;
use crate::types::{ChatMode, ChatReply, ChatRequest};

/// POST /rag_chat - Answer a message from the caller's own documents
///
/// Always replies with a mode-shaped JSON body. A body that is absent or not
/// valid JSON is treated like an empty message.
pub async fn rag_chat(
    State(state): State<AppState>,
    request: Option<Json<ChatRequest>>,
) -> ChatReply {
    let mode = state.mode();
    let request = request.map(|Json(r)| r).unwrap_or_default();

    let chat = match request.validate(mode) {
        Ok(chat) => chat,
        Err(e) => {
            tracing::debug!("Rejected chat request: {}", e);
            return ChatReply::failure(mode, &e);
        }
    };

    tracing::info!(
        "Chat request (user: {}, {} chars)",
        chat.user_id.as_deref().unwrap_or("<none>"),
        chat.query.len()
    );

    match answer(&state, mode, &chat.query, chat.user_id.as_deref()).await {
        Ok(text) => ChatReply::answer(text),
        Err(e) => {
            tracing::error!("Error in RAG pipeline: {}", e);
            ChatReply::failure(mode, &e)
        }
    }
}

async fn answer(state: &AppState, mode: ChatMode, query: &str, user_id: Option<&str>) -> Result<String> {
    let filter = MetadataFilter::user_scope(user_id);
    let output = state.pipeline().invoke(query, &filter).await?;

    tracing::debug!(
        "Answered from {} source documents",
        output.source_documents.len()
    );

    if mode.persists_exchange() {
        if let Some(user_id) = user_id {
            state.persist_exchange(user_id, query, &output.result).await;
        }
    }

    Ok(output.result)
}
