//! LLM integration for answering questions about uploaded documents.

mod ai_types;
mod chat_model;
mod client;
pub mod error;
pub mod prompts;

#[cfg(test)]
mod retry_tests;
#[cfg(test)]
mod tests;

pub use chat_model::{ChatMessage, ChatModel, Role};
pub use client::{LlmClient, RetryPolicy, truncate};
pub use error::LlmError;
