//! Capabilities the engine consumes but does not implement.

use async_trait::async_trait;

/// Produces fixed-length vectors for text.
///
/// Failures are never fatal to a query: the engine treats them as
/// "no semantic score available".
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `hash:d256`).
    fn id(&self) -> &str;
    /// Embedding dimensionality.
    fn dim(&self) -> usize;
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Secondary relevance model used by the re-ranking stage
/// (typically a cross-encoder over query and chunk text).
///
/// Higher is better. A failed call leaves the candidate's fused score in place.
#[async_trait]
pub trait RerankModel: Send + Sync {
    fn name(&self) -> &str;
    async fn score(&self, query: &str, chunk_text: &str) -> anyhow::Result<f32>;
}
