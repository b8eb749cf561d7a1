//! hyrank-vector
//!
//! Semantic side of the engine: cosine similarity between a query vector and
//! the vectors stored on chunks. Vectors are produced elsewhere.

pub mod search;

pub use search::{cosine_similarity, SemanticScorer};
