use std::sync::Arc;
use std::time::{Duration, Instant};

use docqa_core::constants::DEFAULT_TITLE;
use docqa_core::{Config, NewSession, SessionRecord, WritePolicy, validate_session_id};
use docqa_embeddings::Embedder;
use docqa_llm::ChatModel;
use docqa_storage::{JsonSessionStore, SessionStore, UploadStore, VectorIndex};

use crate::chat::{Answer, ChatOrchestrator};
use crate::error::ServiceError;
use crate::ingest::{DocumentLoader, IngestionPipeline, TextSplitter, validate_upload};
use crate::locks::SessionLocks;

/// An uploaded file as received from the client.
#[derive(Debug, Clone, Copy)]
pub struct DocumentUpload<'a> {
    /// Requested id; a UUID is generated when absent or blank.
    pub session_id: Option<&'a str>,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub bytes: &'a [u8],
}

/// Upload, chat and session management on top of the store and pipeline.
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    uploads: UploadStore,
    pipeline: IngestionPipeline,
    orchestrator: ChatOrchestrator,
    locks: SessionLocks,
    max_upload_bytes: usize,
    answer_timeout: Duration,
}

impl SessionService {
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionStore>,
        uploads: UploadStore,
        pipeline: IngestionPipeline,
        orchestrator: ChatOrchestrator,
        max_upload_bytes: usize,
        answer_timeout: Duration,
    ) -> Self {
        Self {
            store,
            uploads,
            pipeline,
            orchestrator,
            locks: SessionLocks::new(),
            max_upload_bytes,
            answer_timeout,
        }
    }

    /// Wires the JSON store, upload directory and pipeline from `config`.
    pub async fn from_config(
        config: &Config,
        loader: Arc<dyn DocumentLoader>,
        embedder: Arc<dyn Embedder>,
        chat_model: Arc<dyn ChatModel>,
    ) -> Result<Self, ServiceError> {
        let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap)?;
        let store =
            JsonSessionStore::open(config.sessions_file.clone(), config.max_live_indices).await?;
        let uploads = UploadStore::new(config.upload_dir.clone());
        uploads.ensure_dir().await?;
        uploads.sweep_partials().await?;

        let pipeline =
            IngestionPipeline::new(loader, splitter, Arc::clone(&embedder), config.ingest_timeout);
        let orchestrator = ChatOrchestrator::new(embedder, chat_model, config.top_k);
        Ok(Self::new(
            Arc::new(store),
            uploads,
            pipeline,
            orchestrator,
            config.max_upload_bytes,
            config.answer_timeout,
        ))
    }

    pub const fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Validates, stores and indexes an upload, creating or replacing the session.
    pub async fn upload_document(
        &self,
        upload: DocumentUpload<'_>,
    ) -> Result<SessionRecord, ServiceError> {
        validate_upload(upload.content_type, upload.bytes, self.max_upload_bytes)?;

        let session_id = match upload.session_id.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        validate_session_id(&session_id).map_err(|e| ServiceError::Validation(e.to_string()))?;
        let title = display_title(upload.file_name);

        let _guard = self.locks.acquire(&session_id).await;
        let started = Instant::now();

        let staged = self.uploads.stage(&session_id, upload.bytes).await?;
        let index = self.pipeline.ingest(staged.path(), &title).await?;
        // the previous upload stays recoverable until the new record is persisted
        let committed = staged.commit().await?;
        let new_session = NewSession {
            session_id: session_id.clone(),
            title,
            source_file_path: committed.path().to_path_buf(),
        };
        let record = self.store.create(new_session, WritePolicy::Overwrite).await?;
        committed.keep().await;
        self.store.attach_index(&session_id, Arc::clone(&index)).await?;

        tracing::info!(
            session_id = %session_id,
            title = %record.title,
            chunks = index.len(),
            bytes = upload.bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "document uploaded"
        );
        Ok(record)
    }

    /// Answers `query` within the session and records the exchange.
    pub async fn chat(&self, session_id: &str, query: &str) -> Result<Answer, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ServiceError::Validation("query must not be empty".to_owned()));
        }

        let _guard = self.locks.acquire(session_id).await;
        let started = Instant::now();
        let record = self.store.get(session_id).await?;
        let index = self.live_index(&record).await?;

        let answer = tokio::time::timeout(
            self.answer_timeout,
            self.orchestrator.answer(&index, query, &record.history),
        )
        .await
        .map_err(|_| ServiceError::Timeout {
            operation: "answer generation",
            after: self.answer_timeout,
        })??;

        let updated = self.store.append_turn(session_id, query, &answer.text).await?;
        tracing::info!(
            session_id = %session_id,
            exchanges = updated.exchange_count(),
            sources = answer.sources.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "question answered"
        );
        Ok(answer)
    }

    pub async fn list_sessions(&self) -> Result<Vec<SessionRecord>, ServiceError> {
        Ok(self.store.list().await?)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<SessionRecord, ServiceError> {
        Ok(self.store.get(session_id).await?)
    }

    /// Removes the session, its index and its stored upload.
    pub async fn delete_session(&self, session_id: &str) -> Result<SessionRecord, ServiceError> {
        let _guard = self.locks.acquire(session_id).await;
        let removed = self.store.delete(session_id).await?;

        // Uploads stored elsewhere by older layouts are left alone.
        if self.uploads.path_for(session_id).is_ok_and(|p| p == removed.source_file_path) {
            self.remove_upload_best_effort(session_id).await;
        }
        tracing::info!(session_id = %session_id, "session deleted");
        Ok(removed)
    }

    async fn live_index(&self, record: &SessionRecord) -> Result<Arc<VectorIndex>, ServiceError> {
        if let Some(index) = self.store.index(&record.session_id).await? {
            return Ok(index);
        }

        let exists = tokio::fs::try_exists(&record.source_file_path).await.unwrap_or(false);
        if !exists {
            tracing::warn!(
                session_id = %record.session_id,
                path = %record.source_file_path.display(),
                "source document missing, cannot rebuild index"
            );
            return Err(ServiceError::DocumentUnavailable {
                session_id: record.session_id.clone(),
            });
        }

        tracing::info!(session_id = %record.session_id, "rebuilding index from stored upload");
        let index = self.pipeline.ingest(&record.source_file_path, &record.title).await?;
        self.store.attach_index(&record.session_id, Arc::clone(&index)).await?;
        Ok(index)
    }

    async fn remove_upload_best_effort(&self, session_id: &str) {
        if let Err(e) = self.uploads.remove(session_id).await {
            tracing::warn!(session_id = %session_id, error = %e, "failed to remove stored upload");
        }
    }
}

/// Last path component of the client-supplied name, or the default title.
fn display_title(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(|| DEFAULT_TITLE.to_owned(), str::to_owned)
}
