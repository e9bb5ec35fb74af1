use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use docqa_embeddings::Embedder;
use docqa_storage::VectorIndex;

use super::{DocumentLoader, IngestError, TextSplitter};
use crate::error::ServiceError;

/// Load, split, embed and index a document.
///
/// Stateless: every call builds a fresh index from the file on disk.
#[derive(Clone)]
pub struct IngestionPipeline {
    loader: Arc<dyn DocumentLoader>,
    splitter: TextSplitter,
    embedder: Arc<dyn Embedder>,
    timeout: Duration,
}

impl IngestionPipeline {
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        splitter: TextSplitter,
        embedder: Arc<dyn Embedder>,
        timeout: Duration,
    ) -> Self {
        Self { loader, splitter, embedder, timeout }
    }

    /// Builds an index for `path` on the blocking pool.
    ///
    /// `source` labels every chunk and shows up in answer citations.
    pub async fn ingest(&self, path: &Path, source: &str) -> Result<Arc<VectorIndex>, ServiceError> {
        let pipeline = self.clone();
        let path_buf = path.to_path_buf();
        let source = source.to_owned();
        let task = tokio::task::spawn_blocking(move || pipeline.run(&path_buf, &source));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(joined) => Ok(Arc::new(joined??)),
            Err(_) => {
                tracing::warn!(
                    path = %path.display(),
                    timeout_secs = self.timeout.as_secs(),
                    "ingestion timed out"
                );
                Err(ServiceError::Timeout { operation: "document ingestion", after: self.timeout })
            },
        }
    }

    fn run(&self, path: &Path, source: &str) -> Result<VectorIndex, IngestError> {
        let started = Instant::now();
        let pages = self.loader.load(path)?;
        let chunks = self.splitter.split_pages(&pages, source);
        if chunks.is_empty() {
            return Err(IngestError::NoText);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts)?;
        let index = VectorIndex::build(
            self.embedder.model_id(),
            self.embedder.dimension(),
            chunks,
            vectors,
        )?;

        tracing::info!(
            path = %path.display(),
            pages = pages.len(),
            chunks = index.len(),
            model = index.model_id(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "document indexed"
        );
        Ok(index)
    }
}
