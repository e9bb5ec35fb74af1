//! Deterministic stand-ins for the PDF parser and the LLM.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use docqa_core::Page;
use docqa_llm::{ChatMessage, ChatModel, LlmError};

use crate::ingest::{DocumentLoader, IngestError};

/// Reads a file as UTF-8 text with form feeds separating pages.
///
/// A leading `%PDF-` header line is skipped, so fixtures can pass upload
/// validation and still hold plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextLoader;

impl DocumentLoader for PlainTextLoader {
    fn load(&self, path: &Path) -> Result<Vec<Page>, IngestError> {
        let bytes = std::fs::read(path).map_err(|e| IngestError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = match text.strip_prefix("%PDF-") {
            Some(rest) => rest.split_once('\n').map_or("", |(_, body)| body),
            None => text.as_str(),
        };
        Ok(body
            .split('\u{c}')
            .zip(1u32..)
            .map(|(page_text, number)| Page { number, text: page_text.to_owned() })
            .collect())
    }
}

/// Chat model that replays queued replies, then a fixed default.
#[derive(Debug)]
pub struct ScriptedChatModel {
    default_reply: String,
    replies: Mutex<VecDeque<String>>,
    failure_status: Option<u16>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChatModel {
    pub fn new(default_reply: impl Into<String>) -> Self {
        Self {
            default_reply: default_reply.into(),
            replies: Mutex::new(VecDeque::new()),
            failure_status: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with this HTTP status.
    pub fn failing(status: u16) -> Self {
        Self { failure_status: Some(status), ..Self::new("") }
    }

    /// Every call sleeps before replying.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap_or_else(PoisonError::into_inner).push_back(reply.into());
    }

    /// Prompts received so far, oldest first.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(messages.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(code) = self.failure_status {
            return Err(LlmError::HttpStatus { code, body: "scripted failure".to_owned() });
        }
        let queued = self.replies.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
        Ok(queued.unwrap_or_else(|| self.default_reply.clone()))
    }
}
