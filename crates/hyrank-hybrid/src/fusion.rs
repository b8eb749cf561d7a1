//! Weighted linear fusion of lexical and semantic scores.
//!
//! BM25 sums are unbounded, so the lexical map is min-max scaled into [0, 1]
//! per query. Cosine similarities are already bounded and are only clamped
//! at zero. A chunk present in either map is a candidate; the missing signal
//! counts as 0.

use std::sync::Arc;

use hyrank_core::types::{Chunk, ScoreMap, SearchConfig, SearchResult};

pub const HIGH_SEMANTIC_THRESHOLD: f32 = 0.7;
pub const STRONG_KEYWORD_THRESHOLD: f32 = 0.7;
pub const EXCELLENT_OVERALL_THRESHOLD: f32 = 0.8;
pub const DEFAULT_EXPLANATION: &str = "General content match";

/// Min-max scales `scores` into [0, 1].
///
/// When every score is equal (including a single entry) each one maps to 0.
pub fn normalize_min_max(scores: &ScoreMap) -> ScoreMap {
    let (min, max) = scores
        .values()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    let range = max - min;
    scores
        .iter()
        .map(|(id, &s)| {
            let n = if range > 0.0 { (s - min) / range } else { 0.0 };
            (id.clone(), n)
        })
        .collect()
}

/// Fuses both maps into results sorted by `hybrid_score`, highest first.
///
/// Candidates are visited in corpus order and sorted stably, so equal scores
/// keep the same relative order for identical inputs.
pub fn combine(
    corpus: &[Arc<Chunk>],
    lexical: &ScoreMap,
    semantic: &ScoreMap,
    config: &SearchConfig,
) -> Vec<SearchResult> {
    let keyword = normalize_min_max(lexical);
    let mut results: Vec<SearchResult> = corpus
        .iter()
        .filter_map(|chunk| {
            let kw = keyword.get(&chunk.id).copied();
            let sem = semantic.get(&chunk.id).copied();
            if kw.is_none() && sem.is_none() {
                return None;
            }
            let keyword_score = kw.unwrap_or(0.0);
            let semantic_score = sem.unwrap_or(0.0).max(0.0);
            let hybrid_score = semantic_score * config.semantic_weight + keyword_score * config.keyword_weight;
            Some(SearchResult {
                chunk: Arc::clone(chunk),
                semantic_score,
                keyword_score,
                hybrid_score,
                explanation: explain(semantic_score, keyword_score, hybrid_score),
                reranked: false,
            })
        })
        .collect();
    sort_by_score(&mut results);
    results
}

/// Stable descending sort on `hybrid_score`.
pub fn sort_by_score(results: &mut [SearchResult]) {
    results.sort_by(|a, b| b.hybrid_score.total_cmp(&a.hybrid_score));
}

pub fn explain(semantic: f32, keyword: f32, hybrid: f32) -> String {
    let mut reasons = Vec::new();
    if semantic > HIGH_SEMANTIC_THRESHOLD {
        reasons.push("high semantic similarity");
    }
    if keyword > STRONG_KEYWORD_THRESHOLD {
        reasons.push("strong keyword matches");
    }
    if hybrid > EXCELLENT_OVERALL_THRESHOLD {
        reasons.push("excellent overall relevance");
    }
    if reasons.is_empty() {
        DEFAULT_EXPLANATION.to_string()
    } else {
        reasons.join(", ")
    }
}
