use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use crate::AppState;
use crate::api_error::ApiError;
use crate::response_types::{DeleteResponse, SessionView};

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SessionView>>, ApiError> {
    let sessions = state.session_service.list_sessions().await?;
    Ok(Json(sessions.into_iter().map(SessionView::from).collect()))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let record = state.session_service.get_session(&session_id).await?;
    Ok(Json(record.into()))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let removed = state.session_service.delete_session(&session_id).await?;
    Ok(Json(DeleteResponse {
        message: format!("Session {} deleted.", removed.session_id),
        session_id: removed.session_id,
    }))
}
