use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_SESSION_ID_LEN;
use crate::error::CoreError;

/// Who said a turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    #[serde(alias = "human")]
    User,
    #[serde(alias = "ai")]
    Assistant,
}

impl Speaker {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { speaker: Speaker::User, text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { speaker: Speaker::Assistant, text: text.into() }
    }
}

/// Metadata for one uploaded document and its conversation.
///
/// The vector index is never part of the record; the store keeps it
/// alongside as a volatile handle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub session_id: String,
    pub title: String,
    pub source_file_path: PathBuf,
    pub history: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    #[must_use]
    pub fn from_new(new: NewSession) -> Self {
        let now = Utc::now();
        Self {
            session_id: new.session_id,
            title: new.title,
            source_file_path: new.source_file_path,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of completed question/answer exchanges.
    #[must_use]
    pub fn exchange_count(&self) -> usize {
        self.history.len() / 2
    }
}

/// Input for creating a session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub session_id: String,
    pub title: String,
    pub source_file_path: PathBuf,
}

/// What `create` does when the id is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Fail with a conflict.
    Reject,
    /// Replace the existing record, resetting its history and index.
    Overwrite,
}

/// Session ids double as file names, so only a conservative alphabet is allowed.
pub fn validate_session_id(id: &str) -> Result<(), CoreError> {
    let invalid = |reason| Err(CoreError::InvalidSessionId { id: id.to_owned(), reason });
    if id.is_empty() {
        return invalid("must not be empty");
    }
    if id.len() > MAX_SESSION_ID_LEN {
        return invalid("too long");
    }
    if id.starts_with('.') {
        return invalid("must not start with '.'");
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')) {
        return invalid("only ASCII letters, digits, '-', '_' and '.' are allowed");
    }
    Ok(())
}
