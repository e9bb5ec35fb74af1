//! Service layer for docqa
//!
//! Centralizes the upload, chat and session workflows between the HTTP
//! handlers and the storage, embedding and LLM crates.

mod chat;
mod error;
pub mod ingest;
mod locks;
mod session_service;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use chat::{Answer, ChatOrchestrator};
pub use error::{ServiceError, UpstreamError};
pub use locks::{SessionGuard, SessionLocks};
pub use session_service::{DocumentUpload, SessionService};
