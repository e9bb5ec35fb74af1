//! Response types (Serialize)

use chrono::{DateTime, Utc};
use docqa_core::{SessionRecord, SourceRef, Turn};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub source_documents: Vec<SourceRef>,
}

/// Public view of a session; the stored file path stays server-side.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub title: String,
    pub history: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionRecord> for SessionView {
    fn from(record: SessionRecord) -> Self {
        Self {
            session_id: record.session_id,
            title: record.title,
            history: record.history,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
}
