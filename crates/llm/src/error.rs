//! Failures talking to an OpenAI-compatible chat completion endpoint.

use thiserror::Error;

/// Statuses worth another attempt: rate limiting and overloaded gateways.
const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 529];

#[derive(Debug, Error)]
pub enum LlmError {
    /// No status arrived: connect, TLS, timeout or body read failure.
    #[error("chat endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status. `body` is truncated.
    #[error("chat endpoint returned {code}: {body}")]
    HttpStatus { code: u16, body: String },

    #[error("malformed completion (body: {excerpt}): {source}")]
    MalformedResponse {
        excerpt: String,
        #[source]
        source: serde_json::Error,
    },

    /// First choice missing or blank.
    #[error("completion contained no answer text")]
    EmptyResponse,

    #[error("could not build HTTP client: {0}")]
    ClientInit(String),

    #[error("gave up after {attempts} attempts, retries exhausted: {last}")]
    RetriesExhausted { attempts: u32, last: Box<LlmError> },
}

impl LlmError {
    /// Whether another attempt could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::HttpStatus { code, .. } => RETRYABLE_STATUSES.contains(code),
            _ => false,
        }
    }
}
