//! HTTP API server for docqa.

pub mod api_error;
mod handlers;
mod request_types;
mod response_types;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use docqa_service::SessionService;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use request_types::ChatRequest;
pub use response_types::{ChatResponse, DeleteResponse, RootResponse, SessionView, UploadResponse};

/// Multipart framing on top of the raw file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared application state for all HTTP handlers.
pub struct AppState {
    pub session_service: Arc<SessionService>,
}

impl AppState {
    pub fn new(session_service: Arc<SessionService>) -> Self {
        Self { session_service }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.session_service.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/", get(health))
        .route("/upload-pdf", post(handlers::documents::upload_pdf))
        .route("/upload-pdf/", post(handlers::documents::upload_pdf))
        .route("/chat", post(handlers::chat::chat))
        .route("/chat/", post(handlers::chat::chat))
        .route("/sessions", get(handlers::sessions::list_sessions))
        .route("/sessions/", get(handlers::sessions::list_sessions))
        .route(
            "/sessions/{session_id}",
            get(handlers::sessions::get_session).delete(handlers::sessions::delete_session),
        )
        .route(
            "/sessions/{session_id}/",
            get(handlers::sessions::get_session).delete(handlers::sessions::delete_session),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "docqa: upload a PDF and ask questions about it",
        version: env!("CARGO_PKG_VERSION"),
    })
}
