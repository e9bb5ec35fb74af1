//! Embedding generation for document chunks and questions.
//!
//! [`FastEmbedder`] runs all-MiniLM-L6-v2 locally through ONNX Runtime.
//! [`HashingEmbedder`] needs no model download and is used for offline
//! deployments and tests.

pub mod error;
mod fast;
mod hashing;

pub use error::EmbeddingError;
pub use fast::FastEmbedder;
pub use hashing::HashingEmbedder;

/// Turns text into fixed-size vectors.
///
/// Implementations are blocking; async callers run them on the blocking pool.
pub trait Embedder: Send + Sync {
    /// Identity of the model, recorded on every index built with it.
    fn model_id(&self) -> &str;

    fn dimension(&self) -> usize;

    /// Embeds `texts` in order. The result has exactly one vector per input.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text.to_owned()])?;
        vectors.pop().ok_or(EmbeddingError::CountMismatch { expected: 1, actual: 0 })
    }
}

/// Checks count and dimension of a batch returned by a backend.
pub(crate) fn check_batch(
    vectors: &[Vec<f32>],
    expected_count: usize,
    dimension: usize,
) -> Result<(), EmbeddingError> {
    if vectors.len() != expected_count {
        return Err(EmbeddingError::CountMismatch {
            expected: expected_count,
            actual: vectors.len(),
        });
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
        return Err(EmbeddingError::DimensionMismatch { expected: dimension, actual: bad.len() });
    }
    Ok(())
}
