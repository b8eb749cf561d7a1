//! hyrank-hybrid
//!
//! Fuses BM25 and cosine scores into one ranking, optionally re-ranks the top
//! of it, and wraps the pipeline in [`HybridSearchEngine`].

pub mod engine;
pub mod fusion;
pub mod rerank;

pub use engine::HybridSearchEngine;
pub use fusion::{combine, normalize_min_max};
pub use rerank::{Reranker, TermOverlapModel};
