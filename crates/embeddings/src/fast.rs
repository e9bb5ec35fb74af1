use std::path::PathBuf;
use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::{Embedder, EmbeddingError, check_batch};

const MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
const DIMENSION: usize = 384;
const BATCH_SIZE: usize = 64;

/// Local sentence-transformer embeddings.
///
/// The ONNX session needs exclusive access, so calls are serialized through a mutex.
pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
}

impl std::fmt::Debug for FastEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedder").field("model", &MODEL_ID).finish()
    }
}

impl FastEmbedder {
    /// Loads the model, downloading it into `cache_dir` on first use.
    pub fn new(cache_dir: PathBuf) -> Result<Self, EmbeddingError> {
        std::fs::create_dir_all(&cache_dir).map_err(|e| {
            EmbeddingError::ModelInit(format!("cannot create {}: {e}", cache_dir.display()))
        })?;
        tracing::info!(model = MODEL_ID, cache_dir = %cache_dir.display(), "loading embedding model");
        let options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_cache_dir(cache_dir)
            .with_show_download_progress(false);
        let model =
            TextEmbedding::try_new(options).map_err(|e| EmbeddingError::ModelInit(e.to_string()))?;
        Ok(Self { model: Mutex::new(model) })
    }
}

impl Embedder for FastEmbedder {
    fn model_id(&self) -> &str {
        MODEL_ID
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut model = self.model.lock().map_err(|_| EmbeddingError::LockPoisoned)?;
        let vectors = model
            .embed(texts.to_vec(), Some(BATCH_SIZE))
            .map_err(|e| EmbeddingError::Generation(e.to_string()))?;
        check_batch(&vectors, texts.len(), DIMENSION)?;
        Ok(vectors)
    }
}
