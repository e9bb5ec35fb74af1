//! Session-keyed storage for uploaded documents.

use std::path::{Path, PathBuf};

use docqa_core::constants::UPLOAD_EXTENSION;
use docqa_core::validate_session_id;
use uuid::Uuid;

use crate::error::StorageError;

const PARTIAL_SUFFIX: &str = ".partial";
const BACKUP_SUFFIX: &str = ".backup";

/// Directory of committed uploads, one file per session.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::io(format!("creating {}", self.dir.display()), e))
    }

    /// Final location of a session's upload.
    pub fn path_for(&self, session_id: &str) -> Result<PathBuf, StorageError> {
        validate_session_id(session_id)?;
        Ok(self.dir.join(format!("{session_id}.{UPLOAD_EXTENSION}")))
    }

    /// Writes `bytes` to a temporary file next to the final location.
    ///
    /// The returned guard deletes the file when dropped unless it was committed.
    pub async fn stage(&self, session_id: &str, bytes: &[u8]) -> Result<TempUpload, StorageError> {
        let final_path = self.path_for(session_id)?;
        self.ensure_dir().await?;
        let tag = Uuid::new_v4();
        let path = self.dir.join(format!(".{session_id}.{tag}{PARTIAL_SUFFIX}"));
        let backup_path = self.dir.join(format!(".{session_id}.{tag}{BACKUP_SUFFIX}"));
        let guard = TempUpload { path, final_path, backup_path, committed: false };
        tokio::fs::write(&guard.path, bytes)
            .await
            .map_err(|e| StorageError::io(format!("writing {}", guard.path.display()), e))?;
        Ok(guard)
    }

    /// Removes a session's committed upload. Returns whether a file was removed.
    pub async fn remove(&self, session_id: &str) -> Result<bool, StorageError> {
        let path = self.path_for(session_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(format!("removing {}", path.display()), e)),
        }
    }

    /// Deletes staged and backup files left behind by a previous process.
    pub async fn sweep_partials(&self) -> Result<usize, StorageError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(StorageError::io(format!("listing {}", self.dir.display()), e));
            },
        };
        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(format!("listing {}", self.dir.display()), e))?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let stale = name.ends_with(PARTIAL_SUFFIX) || name.ends_with(BACKUP_SUFFIX);
            if !(name.starts_with('.') && stale) {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(file = %name, error = %e, "failed to remove stale upload"),
            }
        }
        if removed > 0 {
            tracing::info!(removed, "removed stale upload files");
        }
        Ok(removed)
    }
}

/// An upload written to disk but not yet accepted.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    final_path: PathBuf,
    backup_path: PathBuf,
    committed: bool,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Moves the file to its session-keyed location.
    ///
    /// A previous upload for the session is moved aside, not deleted, until the
    /// returned [`CommittedUpload`] is kept.
    pub async fn commit(mut self) -> Result<CommittedUpload, StorageError> {
        let backup = match tokio::fs::rename(&self.final_path, &self.backup_path).await {
            Ok(()) => Some(self.backup_path.clone()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(StorageError::io(
                    format!("moving aside {}", self.final_path.display()),
                    e,
                ));
            },
        };

        if let Err(e) = tokio::fs::rename(&self.path, &self.final_path).await {
            if let Some(backup) = &backup {
                restore(backup, &self.final_path);
            }
            return Err(StorageError::io(format!("committing {}", self.final_path.display()), e));
        }
        self.committed = true;
        Ok(CommittedUpload { path: self.final_path.clone(), backup, settled: false })
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove temporary upload");
        }
    }
}

/// An upload in its final location whose acceptance is still pending.
///
/// Dropping it without [`keep`](Self::keep) puts the previous upload back, or
/// removes the file when there was none.
#[derive(Debug)]
pub struct CommittedUpload {
    path: PathBuf,
    backup: Option<PathBuf>,
    settled: bool,
}

impl CommittedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accepts the upload and discards the previous one.
    pub async fn keep(mut self) -> PathBuf {
        self.settled = true;
        if let Some(backup) = self.backup.take()
            && let Err(e) = tokio::fs::remove_file(&backup).await
        {
            tracing::warn!(path = %backup.display(), error = %e, "failed to remove upload backup");
        }
        self.path.clone()
    }
}

impl Drop for CommittedUpload {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        match &self.backup {
            Some(backup) => restore(backup, &self.path),
            None => {
                if let Err(e) = std::fs::remove_file(&self.path)
                    && e.kind() != std::io::ErrorKind::NotFound
                {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to remove rejected upload");
                }
            },
        }
    }
}

fn restore(backup: &Path, path: &Path) {
    match std::fs::rename(backup, path) {
        Ok(()) => tracing::info!(path = %path.display(), "previous upload restored"),
        Err(e) => tracing::error!(
            path = %path.display(),
            backup = %backup.display(),
            error = %e,
            "failed to restore previous upload"
        ),
    }
}
