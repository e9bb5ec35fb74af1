//! In-memory vector index over document chunks.
//!
//! Brute-force cosine similarity: one index per uploaded document, a few
//! hundred to a few thousand chunks, so a linear scan is fast enough and keeps
//! results exact.

use docqa_core::Chunk;

use crate::error::IndexError;

struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
    norm: f32,
}

/// A chunk returned by [`VectorIndex::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f32,
}

pub struct VectorIndex {
    model_id: String,
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("model_id", &self.model_id)
            .field("dimension", &self.dimension)
            .field("len", &self.entries.len())
            .finish()
    }
}

impl VectorIndex {
    /// Builds an index from chunks and their embeddings (same order).
    pub fn build(
        model_id: impl Into<String>,
        dimension: usize,
        chunks: Vec<Chunk>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self, IndexError> {
        if chunks.len() != vectors.len() {
            return Err(IndexError::LengthMismatch {
                chunks: chunks.len(),
                vectors: vectors.len(),
            });
        }
        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| {
                validate(&vector, dimension)?;
                let norm = l2_norm(&vector);
                Ok(IndexEntry { chunk, vector, norm })
            })
            .collect::<Result<Vec<_>, IndexError>>()?;
        Ok(Self { model_id: model_id.into(), dimension, entries })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `k` chunks by cosine similarity, best first. Ties keep document order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, IndexError> {
        validate(query, self.dimension)?;
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        let query_norm = l2_norm(query);

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let denom = entry.norm * query_norm;
                let score = if denom > 0.0 { dot(&entry.vector, query) / denom } else { 0.0 };
                (i, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .filter_map(|(i, score)| {
                self.entries.get(i).map(|e| ScoredChunk { chunk: e.chunk.clone(), score })
            })
            .collect())
    }
}

fn validate(vector: &[f32], dimension: usize) -> Result<(), IndexError> {
    if vector.len() != dimension {
        return Err(IndexError::DimensionMismatch { expected: dimension, actual: vector.len() });
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(IndexError::NonFinite);
    }
    Ok(())
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn l2_norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}
