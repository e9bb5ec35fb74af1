//! On-disk layout of the sessions file and atomic writes.
//!
//! ```json
//! {"sessions": {"<id>": {"title": "...", "history": [...], "uploaded_file": "..."}}}
//! ```
//!
//! Older files store `history` as a flat list of strings alternating
//! user/assistant and carry no timestamps; both shapes load.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use docqa_core::constants::DEFAULT_TITLE;
use docqa_core::{SessionRecord, Speaker, Turn, validate_session_id};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct SessionFile {
    #[serde(default)]
    pub sessions: BTreeMap<String, PersistedSession>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PersistedSession {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub history: Vec<PersistedTurn>,
    pub uploaded_file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum PersistedTurn {
    Tagged(Turn),
    Legacy(String),
}

fn default_title() -> String {
    DEFAULT_TITLE.to_owned()
}

impl PersistedSession {
    pub fn from_record(record: &SessionRecord) -> Self {
        Self {
            title: record.title.clone(),
            history: record.history.iter().cloned().map(PersistedTurn::Tagged).collect(),
            uploaded_file: record.source_file_path.clone(),
            created_at: Some(record.created_at),
            updated_at: Some(record.updated_at),
        }
    }

    pub fn into_record(self, session_id: String, loaded_at: DateTime<Utc>) -> SessionRecord {
        let history = self
            .history
            .into_iter()
            .enumerate()
            .map(|(position, turn)| match turn {
                PersistedTurn::Tagged(turn) => turn,
                PersistedTurn::Legacy(text) => {
                    let speaker = if position % 2 == 0 { Speaker::User } else { Speaker::Assistant };
                    Turn { speaker, text }
                },
            })
            .collect();
        let created_at = self.created_at.unwrap_or(loaded_at);
        SessionRecord {
            session_id,
            title: self.title,
            source_file_path: self.uploaded_file,
            history,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}

/// Serializes records into the file layout.
pub(crate) fn encode<'a>(
    records: impl Iterator<Item = &'a SessionRecord>,
) -> Result<Vec<u8>, StorageError> {
    let file = SessionFile {
        sessions: records
            .map(|r| (r.session_id.clone(), PersistedSession::from_record(r)))
            .collect(),
    };
    Ok(serde_json::to_vec_pretty(&file)?)
}

/// Result of reading the sessions file.
#[derive(Debug)]
pub(crate) struct Loaded {
    pub records: Vec<SessionRecord>,
    /// Where a corrupted file was moved, if it was.
    pub quarantined: Option<PathBuf>,
}

enum Parsed {
    Empty,
    File(SessionFile),
    Corrupt(serde_json::Error),
}

fn parse(path: &Path) -> Result<Parsed, StorageError> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Parsed::Empty),
        Err(e) => return Err(StorageError::io(format!("reading {}", path.display()), e)),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Parsed::Empty);
    }
    Ok(match serde_json::from_slice(&bytes) {
        Ok(file) => Parsed::File(file),
        Err(e) => Parsed::Corrupt(e),
    })
}

fn into_records(file: SessionFile) -> Vec<SessionRecord> {
    let loaded_at = Utc::now();
    file.sessions
        .into_iter()
        .filter_map(|(id, session)| {
            if let Err(e) = validate_session_id(&id) {
                tracing::warn!(error = %e, "skipping persisted session with unusable id");
                return None;
            }
            Some(session.into_record(id, loaded_at))
        })
        .collect()
}

/// Reads the sessions file.
///
/// A missing or empty file yields no records. A file that cannot be parsed is
/// moved aside to `<name>.corrupt-<unix-ts>` and also yields no records.
/// Other read failures are returned.
pub(crate) fn load(path: &Path) -> Result<Loaded, StorageError> {
    match parse(path)? {
        Parsed::Empty => {
            tracing::info!(path = %path.display(), "no stored sessions, starting fresh");
            Ok(Loaded { records: Vec::new(), quarantined: None })
        },
        Parsed::File(file) => Ok(Loaded { records: into_records(file), quarantined: None }),
        Parsed::Corrupt(e) => {
            let quarantined = quarantine(path);
            tracing::warn!(
                path = %path.display(),
                error = %e,
                moved_to = ?quarantined,
                "sessions file is corrupted, discarding all sessions"
            );
            Ok(Loaded { records: Vec::new(), quarantined })
        },
    }
}

/// Reads the sessions file without touching it; corruption is an error.
pub(crate) fn read_only(path: &Path) -> Result<Vec<SessionRecord>, StorageError> {
    match parse(path)? {
        Parsed::Empty => Ok(Vec::new()),
        Parsed::File(file) => Ok(into_records(file)),
        Parsed::Corrupt(e) => Err(StorageError::DataCorruption {
            context: format!("parsing {}", path.display()),
            source: Box::new(e),
        }),
    }
}

fn quarantine(path: &Path) -> Option<PathBuf> {
    let file_name = path.file_name()?.to_string_lossy().into_owned();
    let target = path.with_file_name(format!("{file_name}.corrupt-{}", Utc::now().timestamp()));
    match fs::rename(path, &target) {
        Ok(()) => Some(target),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not move corrupted sessions file aside");
            None
        },
    }
}

/// Writes `bytes` to `path` via temp file, fsync and rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    fs::create_dir_all(parent)
        .map_err(|e| StorageError::io(format!("creating {}", parent.display()), e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sessions.json".to_owned());
    let tmp_path = parent.join(format!(".{file_name}.tmp"));

    let result = (|| {
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(bytes)?;
        tmp.sync_all()?;
        drop(tmp);
        fs::rename(&tmp_path, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(StorageError::io(format!("writing {}", path.display()), e));
    }
    Ok(())
}
