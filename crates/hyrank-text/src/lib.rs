//! hyrank-text
//!
//! Lexical side of the engine: tokenizer, inverted index with BM25 IDF, and
//! the BM25 scorer.

pub mod bm25;
pub mod index;
pub mod tokenizer;

pub use bm25::{Bm25Params, Bm25Scorer};
pub use index::LexicalIndex;
pub use tokenizer::{term_counts, tokenize};
