use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hyrank_core::traits::RerankModel;
use hyrank_core::types::{Chunk, ScoreMap, SearchConfig, SearchResult};
use hyrank_hybrid::fusion::{combine, explain};
use hyrank_hybrid::{Reranker, TermOverlapModel};

/// Scores by exact chunk text; unknown text fails, `"slow"` never answers in time.
struct ScriptedModel {
    scores: HashMap<String, f32>,
}

#[async_trait]
impl RerankModel for ScriptedModel {
    fn name(&self) -> &str { "scripted" }

    async fn score(&self, _query: &str, chunk_text: &str) -> anyhow::Result<f32> {
        if chunk_text == "slow" {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        self.scores.get(chunk_text).copied().ok_or_else(|| anyhow::anyhow!("no score for {chunk_text}"))
    }
}

fn scripted(pairs: &[(&str, f32)]) -> Arc<dyn RerankModel> {
    Arc::new(ScriptedModel { scores: pairs.iter().map(|(t, s)| (t.to_string(), *s)).collect() })
}

/// Fused list where chunk `i` has text `texts[i]` and fused score descending with `i`.
fn fused(texts: &[&str]) -> Vec<SearchResult> {
    let corpus: Vec<Arc<Chunk>> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| Arc::new(Chunk::new(format!("c{i}"), *t)))
        .collect();
    let lexical: ScoreMap = corpus
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.clone(), (texts.len() - i) as f32))
        .collect();
    let config = SearchConfig { semantic_weight: 0.0, keyword_weight: 1.0, ..SearchConfig::default() };
    combine(&corpus, &lexical, &ScoreMap::new(), &config)
}

fn ids(results: &[SearchResult]) -> Vec<String> {
    results.iter().map(|r| r.id().to_string()).collect()
}

fn sorted_ids(results: &[SearchResult]) -> Vec<String> {
    let mut v = ids(results);
    v.sort();
    v
}

#[tokio::test]
async fn model_scores_replace_fused_scores() {
    let before = fused(&["first", "second", "third"]);
    let reranker = Reranker::new(scripted(&[("first", 0.1), ("second", 0.9), ("third", 0.5)]), Duration::from_secs(1));
    let after = reranker.rerank(before.clone(), "query", 50).await;

    assert_eq!(ids(&after), vec!["c1", "c2", "c0"]);
    assert_eq!(after[0].hybrid_score, 0.9);
    assert!(after.iter().all(|r| r.reranked));
    assert_eq!(sorted_ids(&after), sorted_ids(&before));
}

#[tokio::test]
async fn failing_candidate_keeps_fused_score() {
    let before = fused(&["first", "unknown", "third"]);
    let fused_score = before[1].hybrid_score;
    let reranker = Reranker::new(scripted(&[("first", 0.2), ("third", 0.1)]), Duration::from_secs(1));
    let after = reranker.rerank(before.clone(), "query", 50).await;

    assert_eq!(after.len(), 3);
    let failed = after.iter().find(|r| r.id() == "c1").unwrap();
    assert!(!failed.reranked);
    assert_eq!(failed.hybrid_score, fused_score);
    assert_eq!(sorted_ids(&after), sorted_ids(&before));
}

#[tokio::test]
async fn slow_candidate_times_out_and_keeps_fused_score() {
    let before = fused(&["fast", "slow"]);
    let fused_score = before[1].hybrid_score;
    let reranker = Reranker::new(scripted(&[("fast", 0.3), ("slow", 1.0)]), Duration::from_millis(50));
    let after = reranker.rerank(before, "query", 50).await;

    let slow = after.iter().find(|r| r.chunk.content == "slow").unwrap();
    assert!(!slow.reranked);
    assert_eq!(slow.hybrid_score, fused_score);
    assert!(after.iter().find(|r| r.chunk.content == "fast").unwrap().reranked);
}

#[tokio::test]
async fn only_the_top_window_is_rescored() {
    let before = fused(&["a1", "a2", "a3", "a4"]);
    let reranker = Reranker::new(scripted(&[("a1", 0.0), ("a2", 0.0), ("a3", 100.0), ("a4", 100.0)]), Duration::from_secs(1));
    let after = reranker.rerank(before.clone(), "query", 2).await;

    let rescored: Vec<&str> = after.iter().filter(|r| r.reranked).map(|r| r.id()).collect();
    assert_eq!(rescored.len(), 2);
    assert!(rescored.contains(&"c0") && rescored.contains(&"c1"));
    assert_eq!(sorted_ids(&after), sorted_ids(&before));
    for pair in after.windows(2) {
        assert!(pair[0].hybrid_score >= pair[1].hybrid_score);
    }
}

#[tokio::test]
async fn explanation_follows_the_model_score() {
    let corpus = vec![Arc::new(Chunk::new("top", "top")), Arc::new(Chunk::new("low", "low"))];
    let lexical: ScoreMap = [("top".to_string(), 4.0), ("low".to_string(), 1.0)].into_iter().collect();
    let semantic: ScoreMap = [("top".to_string(), 0.95), ("low".to_string(), 0.0)].into_iter().collect();
    let before = combine(&corpus, &lexical, &semantic, &SearchConfig::default());
    assert!(before[0].explanation.contains("excellent overall relevance"));

    let reranker = Reranker::new(scripted(&[("top", 0.1), ("low", 0.05)]), Duration::from_secs(1));
    let after = reranker.rerank(before, "query", 50).await;
    let top = after.iter().find(|r| r.id() == "top").unwrap();
    assert!(!top.explanation.contains("excellent overall relevance"));
    assert_eq!(top.explanation, explain(top.semantic_score, top.keyword_score, 0.1));
    assert_eq!(top.explanation, "high semantic similarity, strong keyword matches");
}

#[tokio::test]
async fn empty_list_is_returned_unchanged() {
    let reranker = Reranker::new(Arc::new(TermOverlapModel), Duration::from_secs(1));
    assert!(reranker.rerank(Vec::new(), "query", 50).await.is_empty());
    assert_eq!(reranker.model_name(), "term-overlap");
}

#[test]
fn term_overlap_is_fraction_of_query_terms() {
    assert_eq!(TermOverlapModel::overlap("rust async runtime", "the tokio runtime for async rust"), 1.0);
    assert!((TermOverlapModel::overlap("rust async runtime", "rust compilers") - 1.0 / 3.0).abs() < 1e-6);
    assert_eq!(TermOverlapModel::overlap("rust rust rust", "rust"), 1.0);
    assert_eq!(TermOverlapModel::overlap("a an", "anything"), 0.0);
    assert_eq!(TermOverlapModel::overlap("gardening", "cooking"), 0.0);
}
