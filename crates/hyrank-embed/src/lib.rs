//! hyrank-embed
//!
//! Embedding providers that plug into [`hyrank_core::traits::Embedder`].
//! Real models live outside this workspace; the hashing embedder here is
//! deterministic and cheap, which is what tests and local runs need.

pub mod hashing;

use std::sync::Arc;

use hyrank_core::config::EmbeddingSettings;
use hyrank_core::traits::Embedder;

pub use hashing::HashingEmbedder;

pub fn default_embedder(settings: &EmbeddingSettings) -> Arc<dyn Embedder> {
    tracing::debug!(dim = settings.dim, "using hashing embedder");
    Arc::new(HashingEmbedder::new(settings.dim))
}
