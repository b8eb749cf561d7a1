use std::sync::Arc;

use hyrank_core::types::{Chunk, ScoreMap};
use tracing::{debug, warn};

/// `dot(a, b) / (|a| * |b|)`, in [-1, 1].
///
/// `None` when the lengths differ or either vector has zero norm; an undefined
/// similarity is not the same thing as a low one.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    Some(sim.clamp(-1.0, 1.0) as f32)
}

/// Scores chunks against one query vector.
pub struct SemanticScorer<'a> {
    query: &'a [f32],
}

impl<'a> SemanticScorer<'a> {
    pub fn new(query: &'a [f32]) -> Self { Self { query } }

    /// Similarity of `chunk`, or `None` if it has no usable vector.
    pub fn score(&self, chunk: &Chunk) -> Option<f32> {
        let v = chunk.embedding.as_deref()?;
        let sim = cosine_similarity(self.query, v);
        if sim.is_none() && v.len() != self.query.len() {
            warn!(id = %chunk.id, expected = self.query.len(), got = v.len(), "embedding dimension mismatch");
        }
        sim
    }

    /// Chunks without a vector are left out of the map entirely.
    pub fn score_all(&self, chunks: &[Arc<Chunk>]) -> ScoreMap {
        let scores: ScoreMap = chunks
            .iter()
            .filter_map(|c| self.score(c).map(|s| (c.id.clone(), s)))
            .collect();
        debug!(scored = scores.len(), skipped = chunks.len() - scores.len(), "semantic pass complete");
        scores
    }
}
