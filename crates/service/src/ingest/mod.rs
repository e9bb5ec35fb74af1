//! Turning an uploaded document into a searchable vector index.

mod loader;
mod pipeline;
mod splitter;
mod validate;

use std::path::PathBuf;

use docqa_embeddings::EmbeddingError;
use docqa_storage::IndexError;
use thiserror::Error;

pub use loader::{DocumentLoader, PdfLoader};
pub use pipeline::IngestionPipeline;
pub use splitter::TextSplitter;
pub use validate::validate_upload;

/// Errors from a single ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not read {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("document contains no extractable text")]
    NoText,

    #[error("chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})")]
    InvalidSplitter { chunk_size: usize, chunk_overlap: usize },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Index(#[from] IndexError),
}
