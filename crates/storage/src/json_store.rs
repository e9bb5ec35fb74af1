//! [`SessionStore`] backed by a single JSON file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use docqa_core::{NewSession, SessionRecord, Turn, WritePolicy, validate_session_id};
use tokio::sync::{Mutex, RwLock};

use crate::error::StorageError;
use crate::session_file;
use crate::traits::SessionStore;
use crate::vector_index::VectorIndex;

struct LiveIndex {
    index: Arc<VectorIndex>,
    last_used: AtomicU64,
}

struct Entry {
    record: SessionRecord,
    live: Option<LiveIndex>,
}

/// Session metadata in memory, mirrored to a JSON file on every mutation.
///
/// At most `max_live_indices` vector indices are kept; attaching past the
/// budget drops the least recently used one. Dropped indices are rebuilt from
/// the stored upload on next use.
pub struct JsonSessionStore {
    path: PathBuf,
    max_live_indices: usize,
    state: RwLock<HashMap<String, Entry>>,
    /// Held across every mutate, write and rollback sequence.
    persist_lock: Mutex<()>,
    clock: AtomicU64,
}

impl std::fmt::Debug for JsonSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSessionStore")
            .field("path", &self.path)
            .field("max_live_indices", &self.max_live_indices)
            .finish_non_exhaustive()
    }
}

impl JsonSessionStore {
    /// Opens the store, loading whatever the file holds.
    ///
    /// A missing, empty or corrupted file starts an empty store.
    pub async fn open(
        path: impl Into<PathBuf>,
        max_live_indices: usize,
    ) -> Result<Self, StorageError> {
        let store = Self {
            path: path.into(),
            max_live_indices: max_live_indices.max(1),
            state: RwLock::new(HashMap::new()),
            persist_lock: Mutex::new(()),
            clock: AtomicU64::new(0),
        };
        store.reload().await?;
        Ok(store)
    }

    /// Sessions currently in the file at `path`, oldest first.
    ///
    /// Never writes or moves the file, so it is safe beside a running store.
    /// A corrupted file is reported as `DataCorruption`.
    pub async fn read_persisted(
        path: impl Into<PathBuf>,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        let path = path.into();
        let mut records =
            tokio::task::spawn_blocking(move || session_file::read_only(&path)).await??;
        sort_oldest_first(&mut records);
        Ok(records)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of vector indices currently held in memory.
    pub async fn live_index_count(&self) -> usize {
        self.state.read().await.values().filter(|e| e.live.is_some()).count()
    }

    /// Writes the current state to disk. Caller must hold `persist_lock`.
    async fn write_snapshot(&self) -> Result<(), StorageError> {
        let bytes = {
            let state = self.state.read().await;
            session_file::encode(state.values().map(|e| &e.record))?
        };
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || session_file::write_atomic(&path, &bytes)).await??;
        Ok(())
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn evict_over_budget(&self, state: &mut HashMap<String, Entry>, keep: &str) {
        loop {
            let live = state.values().filter(|e| e.live.is_some()).count();
            if live <= self.max_live_indices {
                return;
            }
            let victim = state
                .iter()
                .filter_map(|(id, e)| {
                    let live = e.live.as_ref()?;
                    (id != keep).then(|| (live.last_used.load(Ordering::Relaxed), id.clone()))
                })
                .min()
                .map(|(_, id)| id);
            let Some(victim) = victim else { return };
            if let Some(entry) = state.get_mut(&victim) {
                entry.live = None;
            }
            tracing::debug!(session_id = %victim, "evicted least recently used index");
        }
    }
}

fn sort_oldest_first(records: &mut [SessionRecord]) {
    records.sort_by(|a, b| {
        a.created_at.cmp(&b.created_at).then_with(|| a.session_id.cmp(&b.session_id))
    });
}

#[async_trait]
impl SessionStore for JsonSessionStore {
    async fn create(
        &self,
        session: NewSession,
        policy: WritePolicy,
    ) -> Result<SessionRecord, StorageError> {
        validate_session_id(&session.session_id)?;
        let record = SessionRecord::from_new(session);
        let id = record.session_id.clone();

        let _persist = self.persist_lock.lock().await;
        let previous = {
            let mut state = self.state.write().await;
            if policy == WritePolicy::Reject && state.contains_key(&id) {
                return Err(StorageError::Duplicate(format!("session {id} already exists")));
            }
            state.insert(id.clone(), Entry { record: record.clone(), live: None })
        };

        if let Err(e) = self.write_snapshot().await {
            let mut state = self.state.write().await;
            match previous {
                Some(prev) => {
                    state.insert(id, prev);
                },
                None => {
                    state.remove(&id);
                },
            }
            return Err(e);
        }

        if previous.is_some() {
            tracing::info!(session_id = %id, "existing session overwritten");
        }
        Ok(record)
    }

    async fn get(&self, session_id: &str) -> Result<SessionRecord, StorageError> {
        let state = self.state.read().await;
        state
            .get(session_id)
            .map(|e| e.record.clone())
            .ok_or_else(|| StorageError::session_not_found(session_id))
    }

    async fn list(&self) -> Result<Vec<SessionRecord>, StorageError> {
        let state = self.state.read().await;
        let mut records: Vec<SessionRecord> = state.values().map(|e| e.record.clone()).collect();
        sort_oldest_first(&mut records);
        Ok(records)
    }

    async fn attach_index(
        &self,
        session_id: &str,
        index: Arc<VectorIndex>,
    ) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let tick = self.tick();
        let entry =
            state.get_mut(session_id).ok_or_else(|| StorageError::session_not_found(session_id))?;
        entry.live = Some(LiveIndex { index, last_used: AtomicU64::new(tick) });
        self.evict_over_budget(&mut state, session_id);
        Ok(())
    }

    async fn index(&self, session_id: &str) -> Result<Option<Arc<VectorIndex>>, StorageError> {
        let state = self.state.read().await;
        let entry =
            state.get(session_id).ok_or_else(|| StorageError::session_not_found(session_id))?;
        Ok(entry.live.as_ref().map(|live| {
            live.last_used.store(self.tick(), Ordering::Relaxed);
            Arc::clone(&live.index)
        }))
    }

    async fn append_turn(
        &self,
        session_id: &str,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<SessionRecord, StorageError> {
        let _persist = self.persist_lock.lock().await;
        let (record, previous_updated_at) = {
            let mut state = self.state.write().await;
            let entry = state
                .get_mut(session_id)
                .ok_or_else(|| StorageError::session_not_found(session_id))?;
            let previous_updated_at = entry.record.updated_at;
            entry.record.history.push(Turn::user(user_text));
            entry.record.history.push(Turn::assistant(assistant_text));
            entry.record.updated_at = Utc::now();
            (entry.record.clone(), previous_updated_at)
        };

        if let Err(e) = self.write_snapshot().await {
            let mut state = self.state.write().await;
            if let Some(entry) = state.get_mut(session_id) {
                entry.record.history.truncate(record.history.len().saturating_sub(2));
                entry.record.updated_at = previous_updated_at;
            }
            return Err(e);
        }
        Ok(record)
    }

    async fn delete(&self, session_id: &str) -> Result<SessionRecord, StorageError> {
        let _persist = self.persist_lock.lock().await;
        let removed = self
            .state
            .write()
            .await
            .remove(session_id)
            .ok_or_else(|| StorageError::session_not_found(session_id))?;

        if let Err(e) = self.write_snapshot().await {
            self.state.write().await.insert(session_id.to_owned(), removed);
            return Err(e);
        }
        Ok(removed.record)
    }

    async fn persist(&self) -> Result<(), StorageError> {
        let _persist = self.persist_lock.lock().await;
        self.write_snapshot().await
    }

    async fn reload(&self) -> Result<(), StorageError> {
        let _persist = self.persist_lock.lock().await;
        let path = self.path.clone();
        let loaded = tokio::task::spawn_blocking(move || session_file::load(&path)).await??;

        let mut state = self.state.write().await;
        let mut previous = std::mem::take(&mut *state);
        for record in loaded.records {
            let live = previous
                .remove(&record.session_id)
                .filter(|old| old.record.source_file_path == record.source_file_path)
                .and_then(|old| old.live);
            state.insert(record.session_id.clone(), Entry { record, live });
        }
        tracing::info!(
            path = %self.path.display(),
            sessions = state.len(),
            recovered_from_corruption = loaded.quarantined.is_some(),
            "sessions loaded"
        );
        Ok(())
    }
}
