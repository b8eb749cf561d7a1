use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use hyrank_core::config::{RerankModelKind, Settings};
use hyrank_core::error::{Error, Result};
use hyrank_core::traits::{Embedder, RerankModel};
use hyrank_core::types::{Chunk, IndexStats, ScoreMap, SearchConfig, SearchOutcome};
use hyrank_text::{Bm25Params, Bm25Scorer, LexicalIndex};
use hyrank_vector::SemanticScorer;

use crate::fusion;
use crate::rerank::{Reranker, TermOverlapModel};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Hybrid search facade.
///
/// One instance owns one corpus. Queries score against a snapshot of the
/// index taken under the read lock; `add_chunks` holds the write lock for the
/// whole rebuild, so a query never sees a half-built index.
pub struct HybridSearchEngine {
    index: RwLock<Arc<LexicalIndex>>,
    embedder: Arc<dyn Embedder>,
    reranker: Option<Reranker>,
    bm25: Bm25Params,
    embed_timeout: Duration,
    defaults: SearchConfig,
}

impl HybridSearchEngine {
    /// Engine with default BM25 parameters and no re-ranking model.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index: RwLock::new(Arc::new(LexicalIndex::new())),
            embedder,
            reranker: None,
            bm25: Bm25Params::default(),
            embed_timeout: DEFAULT_TIMEOUT,
            defaults: SearchConfig::default(),
        }
    }

    /// Builds an engine from loaded settings: hashing embedder, configured
    /// BM25 parameters, timeouts and re-ranking model.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let mut engine = Self::new(hyrank_embed::default_embedder(&settings.embedding))
            .with_bm25_params(settings.bm25.into())
            .with_embed_timeout(Duration::from_millis(settings.embedding.timeout_ms));
        engine.defaults = settings.search.clone();
        if settings.rerank.model == RerankModelKind::TermOverlap {
            engine = engine.with_reranker(Arc::new(TermOverlapModel), Duration::from_millis(settings.rerank.timeout_ms));
        }
        Ok(engine)
    }

    pub fn with_reranker(mut self, model: Arc<dyn RerankModel>, timeout: Duration) -> Self {
        self.reranker = Some(Reranker::new(model, timeout));
        self
    }

    pub fn with_bm25_params(mut self, params: Bm25Params) -> Self {
        self.bm25 = params;
        self
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }

    pub fn reranker_name(&self) -> Option<&str> { self.reranker.as_ref().map(Reranker::model_name) }

    /// The search configuration this engine was built with.
    pub fn default_config(&self) -> &SearchConfig { &self.defaults }

    /// Adds chunks as given; chunks without a vector get no semantic score.
    pub async fn add_chunks(&self, chunks: Vec<Chunk>) -> usize {
        if chunks.is_empty() {
            return 0;
        }
        let mut guard = self.index.write().await;
        Arc::make_mut(&mut *guard).add_chunks(chunks)
    }

    /// Embeds chunks that arrive without a vector, then adds them.
    ///
    /// A chunk whose embedding fails is still indexed, lexically only.
    #[instrument(skip_all, fields(chunks = chunks.len(), embedder = self.embedder.id()))]
    pub async fn index(&self, mut chunks: Vec<Chunk>) -> usize {
        let pending: Vec<usize> = chunks
            .iter()
            .enumerate()
            .filter(|(_, c)| c.embedding.is_none())
            .map(|(i, _)| i)
            .collect();
        let embedded = join_all(pending.iter().map(|&i| self.embed_bounded(&chunks[i].content))).await;
        let mut failed = 0usize;
        for (i, outcome) in pending.into_iter().zip(embedded) {
            match outcome {
                Ok(v) => chunks[i].embedding = Some(v),
                Err(e) => {
                    failed += 1;
                    warn!(id = %chunks[i].id, error = %e, "indexing chunk without a vector");
                }
            }
        }
        if failed > 0 {
            info!(failed, "some chunks have no semantic signal");
        }
        self.add_chunks(chunks).await
    }

    /// Embeds `query` and runs the full pipeline.
    ///
    /// An embedding failure downgrades the query to lexical-only and is
    /// reported on the outcome; only configuration problems are errors.
    #[instrument(skip_all, fields(query_len = query.len()))]
    pub async fn search(&self, query: &str, config: &SearchConfig) -> Result<SearchOutcome> {
        config.validate()?;
        let snapshot = self.snapshot().await;
        if snapshot.is_empty() {
            return Ok(empty_outcome());
        }
        match self.embed_bounded(query).await {
            Ok(v) => self.run(snapshot, query, Some(v), None, config).await,
            Err(e) => {
                warn!(error = %e, "query embedding unavailable, continuing lexical-only");
                self.run(snapshot, query, None, Some(e.to_string()), config).await
            }
        }
    }

    /// Same as [`search`](Self::search) with a caller-supplied query vector.
    #[instrument(skip_all, fields(query_len = query.len(), has_vector = query_vector.is_some()))]
    pub async fn search_with_vector(
        &self,
        query: &str,
        query_vector: Option<Vec<f32>>,
        config: &SearchConfig,
    ) -> Result<SearchOutcome> {
        config.validate()?;
        let snapshot = self.snapshot().await;
        if snapshot.is_empty() {
            return Ok(empty_outcome());
        }
        let reason = query_vector.is_none().then(|| "no query vector supplied".to_string());
        self.run(snapshot, query, query_vector, reason, config).await
    }

    pub async fn stats(&self) -> IndexStats {
        self.snapshot().await.stats()
    }

    async fn snapshot(&self) -> Arc<LexicalIndex> {
        Arc::clone(&*self.index.read().await)
    }

    async fn run(
        &self,
        index: Arc<LexicalIndex>,
        query: &str,
        query_vector: Option<Vec<f32>>,
        degraded_reason: Option<String>,
        config: &SearchConfig,
    ) -> Result<SearchOutcome> {
        let started = Instant::now();
        let (lexical, semantic) = score_concurrently(Arc::clone(&index), query, query_vector, self.bm25).await?;
        let mut results = fusion::combine(index.chunks(), &lexical, &semantic, config);
        debug!(candidates = results.len(), lexical = lexical.len(), semantic = semantic.len(), "fusion complete");

        if config.rerank {
            match &self.reranker {
                Some(reranker) => results = reranker.rerank(results, query, config.rerank_top_n).await,
                None => debug!("re-ranking requested but no model configured"),
            }
        }

        results.retain(|r| r.hybrid_score >= config.min_score);
        results.truncate(config.max_results);
        debug!(returned = results.len(), elapsed_ms = started.elapsed().as_millis() as u64, "search complete");
        Ok(SearchOutcome { results, semantic_degraded: degraded_reason.is_some(), degraded_reason })
    }

    async fn embed_bounded(&self, text: &str) -> Result<Vec<f32>> {
        let v = tokio::time::timeout(self.embed_timeout, self.embedder.embed(text))
            .await
            .map_err(|_| Error::EmbeddingUnavailable(format!("timed out after {} ms", self.embed_timeout.as_millis())))?
            .map_err(|e| Error::EmbeddingUnavailable(e.to_string()))?;
        if v.len() != self.embedder.dim() {
            return Err(Error::EmbeddingUnavailable(format!(
                "expected {} dimensions, got {}",
                self.embedder.dim(),
                v.len()
            )));
        }
        Ok(v)
    }
}

fn empty_outcome() -> SearchOutcome {
    SearchOutcome { results: Vec::new(), semantic_degraded: false, degraded_reason: None }
}

/// Runs BM25 and cosine scoring on the blocking pool side by side. They share
/// nothing but the read-only snapshot.
async fn score_concurrently(
    index: Arc<LexicalIndex>,
    query: &str,
    query_vector: Option<Vec<f32>>,
    params: Bm25Params,
) -> Result<(ScoreMap, ScoreMap)> {
    let lexical_index = Arc::clone(&index);
    let lexical_query = query.to_string();
    let lexical = tokio::task::spawn_blocking(move || Bm25Scorer::new(&lexical_index, params).score_all(&lexical_query));
    let semantic = tokio::task::spawn_blocking(move || match query_vector {
        Some(v) => SemanticScorer::new(&v).score_all(index.chunks()),
        None => ScoreMap::new(),
    });
    tokio::try_join!(lexical, semantic).map_err(|e| Error::Operation(format!("scoring task failed: {e}")))
}
