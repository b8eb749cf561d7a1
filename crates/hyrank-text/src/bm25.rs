//! Okapi BM25 over [`LexicalIndex`].
//!
//! For each distinct query term `t` present in a chunk:
//!
//! ```text
//! idf(t) * tf * (k1 + 1) / (tf + k1 * (1 - b + b * docLen / avgDocLen))
//! ```
//!
//! `tf` and `docLen` come from tokenizing the chunk at query time; `idf` and
//! `avgDocLen` come from the index. Every indexed chunk is scored, there is no
//! candidate pruning; chunks matching no query term are left out of the map.

use std::collections::HashSet;

use hyrank_core::config::Bm25Settings;
use hyrank_core::types::{Chunk, ScoreMap};
use tracing::debug;

use crate::index::LexicalIndex;
use crate::tokenizer::{term_counts, tokenize};

/// BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f32,
    /// Length normalization strength.
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

impl From<Bm25Settings> for Bm25Params {
    fn from(s: Bm25Settings) -> Self {
        Self { k1: s.k1, b: s.b }
    }
}

pub struct Bm25Scorer<'a> {
    index: &'a LexicalIndex,
    params: Bm25Params,
}

impl<'a> Bm25Scorer<'a> {
    pub fn new(index: &'a LexicalIndex, params: Bm25Params) -> Self {
        Self { index, params }
    }

    /// Lexical score of `chunk` for `query`; never negative.
    pub fn score(&self, query: &str, chunk: &Chunk) -> f32 {
        self.score_terms(&distinct_terms(query), chunk)
    }

    /// Scores every indexed chunk; only chunks that matched at least one
    /// query term (score > 0) appear in the map.
    pub fn score_all(&self, query: &str) -> ScoreMap {
        let terms = distinct_terms(query);
        let scores: ScoreMap = self
            .index
            .chunks()
            .iter()
            .filter_map(|chunk| {
                let score = self.score_terms(&terms, chunk);
                (score > 0.0).then(|| (chunk.id.clone(), score))
            })
            .collect();
        debug!(terms = terms.len(), matched = scores.len(), chunks = self.index.len(), "bm25 pass complete");
        scores
    }

    fn score_terms(&self, terms: &[String], chunk: &Chunk) -> f32 {
        let avg_doc_len = self.index.avg_doc_len();
        if terms.is_empty() || avg_doc_len <= 0.0 {
            return 0.0;
        }
        let counts = term_counts(&chunk.content);
        let doc_len = counts.values().sum::<u32>() as f32;
        let Bm25Params { k1, b } = self.params;
        let length_norm = 1.0 - b + b * (doc_len / avg_doc_len);

        let mut score = 0.0f32;
        for term in terms {
            let tf = counts.get(term).copied().unwrap_or(0) as f32;
            let idf = self.index.idf(term);
            if tf == 0.0 || idf == 0.0 {
                continue;
            }
            score += idf * (tf * (k1 + 1.0)) / (tf + k1 * length_norm);
        }
        score
    }
}

/// Query terms with repeats removed, first occurrence order kept.
fn distinct_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(query).into_iter().filter(|t| seen.insert(t.clone())).collect()
}
