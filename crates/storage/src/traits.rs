use std::sync::Arc;

use async_trait::async_trait;
use docqa_core::{NewSession, SessionRecord, WritePolicy};

use crate::error::StorageError;
use crate::vector_index::VectorIndex;

/// Session metadata plus volatile ownership of per-session vector indices.
///
/// Every mutating call persists before returning; a persistence failure is
/// returned to the caller and the in-memory change is rolled back.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session. With [`WritePolicy::Reject`] an existing id is a
    /// `Duplicate` error; with [`WritePolicy::Overwrite`] the old record, its
    /// history and its index are replaced.
    async fn create(
        &self,
        session: NewSession,
        policy: WritePolicy,
    ) -> Result<SessionRecord, StorageError>;

    /// Get session by ID.
    async fn get(&self, session_id: &str) -> Result<SessionRecord, StorageError>;

    /// All sessions, oldest first.
    async fn list(&self) -> Result<Vec<SessionRecord>, StorageError>;

    /// Associate a live index with a session, replacing any previous one.
    async fn attach_index(
        &self,
        session_id: &str,
        index: Arc<VectorIndex>,
    ) -> Result<(), StorageError>;

    /// Live index for a session, if one is held in memory.
    async fn index(&self, session_id: &str) -> Result<Option<Arc<VectorIndex>>, StorageError>;

    /// Append a user turn and an assistant turn together.
    async fn append_turn(
        &self,
        session_id: &str,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<SessionRecord, StorageError>;

    /// Delete a session and drop its index. Returns the removed record.
    async fn delete(&self, session_id: &str) -> Result<SessionRecord, StorageError>;

    /// Write all metadata to the backing file.
    async fn persist(&self) -> Result<(), StorageError>;

    /// Replace in-memory metadata with the backing file's contents.
    async fn reload(&self) -> Result<(), StorageError>;
}
