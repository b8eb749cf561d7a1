//! Optional second pass over the fused list.
//!
//! Only the first `top_n` candidates are sent to the model. The candidate set
//! never changes: a candidate whose model call fails or times out keeps its
//! fused score, and everything is re-sorted afterwards. A re-scored
//! candidate's explanation is rebuilt against the model score.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use hyrank_core::error::Error;
use hyrank_core::traits::RerankModel;
use hyrank_core::types::SearchResult;
use hyrank_text::tokenize;
use tracing::{debug, instrument, warn};

use crate::fusion::{explain, sort_by_score};

pub struct Reranker {
    model: Arc<dyn RerankModel>,
    timeout: Duration,
}

impl Reranker {
    pub fn new(model: Arc<dyn RerankModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    pub fn model_name(&self) -> &str { self.model.name() }

    #[instrument(skip_all, fields(model = self.model.name(), candidates = results.len(), top_n = top_n))]
    pub async fn rerank(&self, mut results: Vec<SearchResult>, query: &str, top_n: usize) -> Vec<SearchResult> {
        let depth = top_n.min(results.len());
        let calls = results[..depth].iter().map(|r| {
            let model = &self.model;
            async move { tokio::time::timeout(self.timeout, model.score(query, &r.chunk.content)).await }
        });
        let outcomes = join_all(calls).await;

        let mut rescored = 0usize;
        for (result, outcome) in results.iter_mut().zip(outcomes) {
            let scored = match outcome {
                Ok(Ok(score)) if score.is_finite() => Ok(score),
                Ok(Ok(score)) => Err(format!("model returned non-finite score {score}")),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err(format!("timed out after {} ms", self.timeout.as_millis())),
            };
            match scored {
                Ok(score) => {
                    result.hybrid_score = score;
                    result.explanation = explain(result.semantic_score, result.keyword_score, score);
                    result.reranked = true;
                    rescored += 1;
                }
                Err(reason) => {
                    let err = Error::RerankFailed { id: result.chunk.id.clone(), reason };
                    warn!(error = %err, "keeping fused score");
                }
            }
        }
        sort_by_score(&mut results);
        debug!(rescored, depth, "re-ranking complete");
        results
    }
}

/// Fraction of distinct query terms that occur in the chunk text.
///
/// Deterministic stand-in for a cross-encoder; scores fall in [0, 1].
#[derive(Debug, Default, Clone, Copy)]
pub struct TermOverlapModel;

impl TermOverlapModel {
    pub fn overlap(query: &str, text: &str) -> f32 {
        let query_terms: HashSet<String> = tokenize(query).into_iter().collect();
        if query_terms.is_empty() {
            return 0.0;
        }
        let text_terms: HashSet<String> = tokenize(text).into_iter().collect();
        let hits = query_terms.iter().filter(|t| text_terms.contains(*t)).count();
        hits as f32 / query_terms.len() as f32
    }
}

#[async_trait]
impl RerankModel for TermOverlapModel {
    fn name(&self) -> &str { "term-overlap" }

    async fn score(&self, query: &str, chunk_text: &str) -> anyhow::Result<f32> {
        Ok(Self::overlap(query, chunk_text))
    }
}
