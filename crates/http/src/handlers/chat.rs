use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use crate::AppState;
use crate::api_error::ApiError;
use crate::request_types::ChatRequest;
use crate::response_types::ChatResponse;

/// `POST /chat/` answers a question about the session's document.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let answer = state.session_service.chat(&req.session_id, &req.user_query).await?;
    Ok(Json(ChatResponse { response: answer.text, source_documents: answer.sources }))
}
