use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use docqa_service::DocumentUpload;

use crate::AppState;
use crate::api_error::ApiError;
use crate::response_types::UploadResponse;

struct FilePart {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: axum::body::Bytes,
}

/// `POST /upload-pdf/` with multipart fields `file` and optional `session_id`.
pub async fn upload_pdf(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<FilePart> = None;
    let mut session_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_owned);
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some(FilePart { file_name, content_type, bytes });
            },
            Some("session_id") => {
                session_id = Some(field.text().await.map_err(multipart_error)?);
            },
            other => tracing::debug!(field = ?other, "ignoring unknown multipart field"),
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("missing multipart field 'file'".to_owned()))?;
    let record = state
        .session_service
        .upload_document(DocumentUpload {
            session_id: session_id.as_deref(),
            file_name: file.file_name.as_deref(),
            content_type: file.content_type.as_deref(),
            bytes: &file.bytes,
        })
        .await?;

    Ok(Json(UploadResponse {
        message: "PDF processed and vector store created.".to_owned(),
        session_id: record.session_id,
    }))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("upload exceeds the size limit".to_owned())
    } else {
        ApiError::BadRequest(format!("malformed multipart body: {}", err.body_text()))
    }
}
