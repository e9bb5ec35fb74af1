//! Typed error enums for the storage layer.
//!
//! Callers match on specific failure modes (not found, duplicate, corrupted
//! backing file, I/O) instead of downcasting opaque boxes.

use docqa_core::CoreError;
use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Record not found for expected-present entity.
    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Create without overwrite hit an existing id.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// Session id unusable as a storage key.
    #[error(transparent)]
    InvalidKey(#[from] CoreError),

    /// Filesystem failure while reading or writing persisted state.
    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Persisted data could not be serialized or deserialized.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A blocking filesystem task panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    TaskJoin(String),
}

impl StorageError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    pub(crate) fn session_not_found(id: &str) -> Self {
        Self::NotFound { entity: "session", id: id.to_owned() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::DataCorruption {
            context: "JSON serialization/deserialization".to_owned(),
            source: Box::new(err),
        }
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}

/// Errors from building or querying a vector index.
#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    #[error("{chunks} chunks but {vectors} vectors")]
    LengthMismatch { chunks: usize, vectors: usize },

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("vector contains NaN or infinite values")]
    NonFinite,
}
