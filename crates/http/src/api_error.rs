//! Typed API error for HTTP handlers.
//!
//! Converts service errors into JSON responses with proper status codes.
//! Handlers return `Result<Json<T>, ApiError>`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docqa_service::ServiceError;

/// API error with HTTP status code and human-readable message.
///
/// Converts to JSON response: `{"error": "message"}`.
///
/// `Internal` and `BadGateway` log the real error server-side and return a
/// static message to the client.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request: invalid input from caller.
    BadRequest(String),
    /// 404 Not Found: requested session doesn't exist.
    NotFound(String),
    /// 409 Conflict: id already taken.
    Conflict(String),
    /// 413 Payload Too Large: upload over the configured limit.
    PayloadTooLarge(String),
    /// 502 Bad Gateway: LLM or embedding backend failed.
    BadGateway(String),
    /// 504 Gateway Timeout: ingestion or answering took too long.
    GatewayTimeout(String),
    /// 500 Internal Server Error: unexpected failure. Details logged, not exposed.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            Self::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            Self::BadGateway(detail) => {
                tracing::error!(error = %detail, "upstream failure");
                (StatusCode::BAD_GATEWAY, "upstream service failed".to_owned())
            },
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            },
        };
        let body = serde_json::json!({"error": message});
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        if !err.is_client_error() {
            return match err {
                e @ ServiceError::Timeout { .. } => Self::GatewayTimeout(e.to_string()),
                e @ ServiceError::Upstream(_) => Self::BadGateway(e.to_string()),
                e => Self::Internal(e.to_string()),
            };
        }
        match err {
            ServiceError::NotFound(id) => Self::NotFound(format!("session '{id}' not found")),
            ServiceError::Conflict(msg) => Self::Conflict(msg),
            ServiceError::Validation(msg) => Self::BadRequest(msg),
            e @ ServiceError::PayloadTooLarge { .. } => Self::PayloadTooLarge(e.to_string()),
            e => Self::BadRequest(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn status_of(err: ServiceError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn service_errors_map_to_statuses() {
        assert_eq!(status_of(ServiceError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ServiceError::NotFound("s".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ServiceError::Conflict("s".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_of(ServiceError::DocumentUnavailable { session_id: "s".into() }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ServiceError::EmptyDocument), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ServiceError::PayloadTooLarge { limit: 1, actual: 2 }),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_of(ServiceError::Timeout { operation: "x", after: Duration::from_secs(1) }),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_of(ServiceError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn status_class_follows_client_error_predicate() {
        let cases: [fn() -> ServiceError; 8] = [
            || ServiceError::Validation("x".into()),
            || ServiceError::NotFound("s".into()),
            || ServiceError::Conflict("s".into()),
            || ServiceError::DocumentUnavailable { session_id: "s".into() },
            || ServiceError::EmptyDocument,
            || ServiceError::PayloadTooLarge { limit: 1, actual: 2 },
            || ServiceError::Timeout { operation: "x", after: Duration::from_secs(1) },
            || ServiceError::Internal("boom".into()),
        ];
        for make in cases {
            let client = make().is_client_error();
            let status = status_of(make());
            assert_eq!(client, status.is_client_error(), "{status}");
            assert_eq!(!client, status.is_server_error(), "{status}");
        }
    }
}
