//! Document ingestion endpoint

use axum::{extract::State, http::StatusCode, Json};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{Document, DocumentMetadata, IngestRequest, IngestResponse};

/// POST /ingest - Embed and store one document for a user
pub async fn ingest_document(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<(StatusCode, Json<IngestResponse>)> {
    let (text, user_id) = request.validate()?;

    let embedding = state
        .embedder()
        .embed_documents(std::slice::from_ref(&text))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::embedding("No embedding returned for document"))?;

    let mut metadata = DocumentMetadata::for_user(&user_id);
    if let Some(topic) = request.topic.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        metadata = metadata.with_topic(topic);
    }

    state
        .vector_store()
        .add_document(&Document::new(text, embedding, metadata))
        .await?;

    tracing::info!("Stored document for {}", user_id);

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            status: "stored".to_string(),
            user_id,
        }),
    ))
}
