//! Domain types shared by the lexical, semantic and hybrid engines.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};

pub type ChunkId = String;

/// Per-chunk scores produced by one signal for one query.
///
/// A missing entry means the signal had nothing to say about that chunk,
/// which is different from a computed score of zero.
pub type ScoreMap = HashMap<ChunkId, f32>;

/// A unit of indexed content.
///
/// - `id`: stable, unique identifier
/// - `content`: the text payload; never mutated once indexed
/// - `embedding`: vector supplied by an external embedding provider, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    pub fn new(id: impl Into<ChunkId>, content: impl Into<String>) -> Self {
        Self { id: id.into(), content: content.into(), embedding: None }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// One ranked hit.
///
/// `chunk` points back into the index; results never own a second copy of
/// the content. `hybrid_score` is the fused score, or the re-ranking model's
/// score when `reranked` is set.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub chunk: Arc<Chunk>,
    pub semantic_score: f32,
    pub keyword_score: f32,
    pub hybrid_score: f32,
    pub explanation: String,
    pub reranked: bool,
}

impl SearchResult {
    pub fn id(&self) -> &str {
        &self.chunk.id
    }
}

/// Per-query parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub semantic_weight: f32,
    pub keyword_weight: f32,
    pub rerank: bool,
    pub max_results: usize,
    pub min_score: f32,
    /// How many of the best fused candidates the re-ranking model scores.
    pub rerank_top_n: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.7,
            keyword_weight: 0.3,
            rerank: true,
            max_results: 10,
            min_score: 0.3,
            rerank_top_n: 50,
        }
    }
}

impl SearchConfig {
    /// Rejects configurations the engine cannot execute meaningfully.
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [("semantic_weight", self.semantic_weight), ("keyword_weight", self.keyword_weight)] {
            if !w.is_finite() {
                return Err(Error::InvalidConfig(format!("{name} must be finite, got {w}")));
            }
            if w < 0.0 {
                return Err(Error::InvalidConfig(format!("{name} must not be negative, got {w}")));
            }
        }
        if self.max_results == 0 {
            return Err(Error::InvalidConfig("max_results must be at least 1".to_string()));
        }
        if !self.min_score.is_finite() {
            return Err(Error::InvalidConfig(format!("min_score must be finite, got {}", self.min_score)));
        }
        Ok(())
    }
}

/// Ranked results plus a note on which signals were actually available.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    /// Set when the query ran without a query vector.
    pub semantic_degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
}

/// Snapshot of index size figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub chunks: usize,
    pub terms: usize,
    pub avg_doc_len: f32,
    pub embedded_chunks: usize,
}
