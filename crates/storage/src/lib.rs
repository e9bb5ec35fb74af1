//! Storage layer for docqa
//!
//! Session metadata persisted to a flat JSON file, session-keyed upload files
//! and the in-memory vector indices built from them.

pub mod error;
mod json_store;
mod session_file;
#[cfg(test)]
mod tests;
pub mod traits;
mod uploads;
pub mod vector_index;

pub use error::{IndexError, StorageError};
pub use json_store::JsonSessionStore;
pub use traits::SessionStore;
pub use uploads::{CommittedUpload, TempUpload, UploadStore};
pub use vector_index::{ScoredChunk, VectorIndex};
