//! Typed error enum for the service layer.
//!
//! Unifies storage, ingestion, LLM and embedding failures into a single error
//! type so handlers can map each failure mode to a response without
//! downcasting.

use std::time::Duration;

use docqa_embeddings::EmbeddingError;
use docqa_llm::LlmError;
use docqa_storage::{IndexError, StorageError};
use thiserror::Error;

use crate::ingest::IngestError;

/// Failure of a dependency the service calls out to.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    #[error("embedding: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// Service-layer error unifying every failure a request can hit.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller provided invalid input (bad content type, bad id, empty query).
    #[error("invalid input: {0}")]
    Validation(String),

    /// Upload body exceeds the configured limit.
    #[error("upload of {actual} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize, actual: usize },

    /// No session with this id.
    #[error("session not found: {0}")]
    NotFound(String),

    /// The id is already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The session exists but its source document is gone from disk.
    #[error("document for session {session_id} is no longer available; upload it again")]
    DocumentUnavailable { session_id: String },

    /// The document yielded no text to index.
    #[error("document contains no extractable text")]
    EmptyDocument,

    /// LLM or embedding call failed.
    #[error("upstream: {0}")]
    Upstream(#[from] UpstreamError),

    /// Session metadata could not be read or written.
    #[error("persistence: {0}")]
    Persistence(StorageError),

    #[error("{operation} timed out after {}s", after.as_secs())]
    Timeout { operation: &'static str, after: Duration },

    #[error("internal: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the caller is at fault (4xx class).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::PayloadTooLarge { .. }
                | Self::NotFound(_)
                | Self::Conflict(_)
                | Self::DocumentUnavailable { .. }
                | Self::EmptyDocument
        )
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { id, .. } => Self::NotFound(id),
            StorageError::Duplicate(msg) => Self::Conflict(msg),
            StorageError::InvalidKey(e) => Self::Validation(e.to_string()),
            other => Self::Persistence(other),
        }
    }
}

impl From<LlmError> for ServiceError {
    fn from(err: LlmError) -> Self {
        Self::Upstream(UpstreamError::Llm(err))
    }
}

impl From<EmbeddingError> for ServiceError {
    fn from(err: EmbeddingError) -> Self {
        Self::Upstream(UpstreamError::Embedding(err))
    }
}

impl From<IndexError> for ServiceError {
    fn from(err: IndexError) -> Self {
        Self::Internal(format!("vector index: {err}"))
    }
}

impl From<IngestError> for ServiceError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Unreadable { reason, .. } => {
                Self::Validation(format!("document could not be parsed: {reason}"))
            },
            IngestError::NoText => Self::EmptyDocument,
            IngestError::Embedding(e) => e.into(),
            IngestError::Index(e) => e.into(),
            e @ IngestError::InvalidSplitter { .. } => Self::Internal(e.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("background task failed: {err}"))
    }
}
