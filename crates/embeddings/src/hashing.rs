use crate::{Embedder, EmbeddingError};

const DEFAULT_DIMENSION: usize = 256;
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Feature-hashing bag-of-words embedder.
///
/// Lowercased alphanumeric tokens are hashed (FNV-1a, stable across processes)
/// into signed buckets and the result is L2-normalised, so cosine similarity
/// reflects shared vocabulary.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    model_id: String,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl HashingEmbedder {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self { dimension, model_id: format!("hashing-bow-{dimension}") }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];
        for token in tokens(text) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            if let Some(slot) = vector.get_mut(bucket) {
                *slot += sign;
            }
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn vectors_are_normalised() {
        let embedder = HashingEmbedder::new(64);
        let v = embedder.embed_one("The quick brown fox").unwrap();
        assert_eq!(v.len(), 64);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::default();
        let v = embedder.embed_one("  ...  ").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn shared_vocabulary_scores_higher() {
        let embedder = HashingEmbedder::default();
        let query = embedder.embed_one("photosynthesis in plants").unwrap();
        let related = embedder.embed_one("Plants perform photosynthesis using light").unwrap();
        let unrelated = embedder.embed_one("Quarterly revenue grew by ten percent").unwrap();
        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[test]
    fn deterministic_and_case_insensitive() {
        let embedder = HashingEmbedder::default();
        assert_eq!(embedder.embed_one("Rust").unwrap(), embedder.embed_one("rust").unwrap());
    }

    #[test]
    fn batch_preserves_order() {
        let embedder = HashingEmbedder::default();
        let texts = vec!["alpha".to_owned(), "beta".to_owned()];
        let batch = embedder.embed_batch(&texts).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], embedder.embed_one("alpha").unwrap());
        assert_eq!(batch[1], embedder.embed_one("beta").unwrap());
    }

    #[test]
    fn check_batch_reports_mismatches() {
        let vectors = vec![vec![0.0; 3]];
        assert!(matches!(
            crate::check_batch(&vectors, 2, 3),
            Err(EmbeddingError::CountMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            crate::check_batch(&vectors, 1, 4),
            Err(EmbeddingError::DimensionMismatch { expected: 4, actual: 3 })
        ));
        assert!(crate::check_batch(&vectors, 1, 3).is_ok());
    }
}
