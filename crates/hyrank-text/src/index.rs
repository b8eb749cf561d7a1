use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use hyrank_core::types::{Chunk, ChunkId, IndexStats};
use tracing::{debug, info, warn};

use crate::tokenizer::tokenize;

/// In-memory inverted index over the chunk corpus.
///
/// Holds the chunks themselves (insertion order), term postings and per-term
/// IDF. IDF and the average document length are rebuilt in full on every
/// successful [`LexicalIndex::add_chunks`]; nothing is ever removed.
#[derive(Debug, Clone, Default)]
pub struct LexicalIndex {
    chunks: Vec<Arc<Chunk>>,
    doc_lens: Vec<usize>,
    positions: HashMap<ChunkId, usize>,
    postings: HashMap<String, HashSet<ChunkId>>,
    idf: HashMap<String, f32>,
    avg_doc_len: f32,
}

impl LexicalIndex {
    pub fn new() -> Self { Self::default() }

    /// Indexes `chunks` and rebuilds IDF. Returns how many were added.
    ///
    /// A chunk whose id is already present is skipped. When nothing is added
    /// the index is left exactly as it was.
    pub fn add_chunks(&mut self, chunks: Vec<Chunk>) -> usize {
        let mut added = 0usize;
        for chunk in chunks {
            if self.positions.contains_key(&chunk.id) {
                warn!(id = %chunk.id, "skipping chunk with an id that is already indexed");
                continue;
            }
            let terms = tokenize(&chunk.content);
            for term in terms.iter() {
                self.postings.entry(term.clone()).or_default().insert(chunk.id.clone());
            }
            self.positions.insert(chunk.id.clone(), self.chunks.len());
            self.doc_lens.push(terms.len());
            self.chunks.push(Arc::new(chunk));
            added += 1;
        }
        if added == 0 {
            debug!("add_chunks: nothing to index");
            return 0;
        }
        self.rebuild_statistics();
        info!(added, total = self.chunks.len(), terms = self.postings.len(), "lexical index rebuilt");
        added
    }

    fn rebuild_statistics(&mut self) {
        let n = self.chunks.len() as f64;
        self.idf = self
            .postings
            .iter()
            .map(|(term, ids)| (term.clone(), bm25_idf(n, ids.len() as f64)))
            .collect();
        let total: usize = self.doc_lens.iter().sum();
        self.avg_doc_len = if self.doc_lens.is_empty() { 0.0 } else { total as f32 / self.doc_lens.len() as f32 };
    }

    pub fn len(&self) -> usize { self.chunks.len() }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    /// Indexed chunks in insertion order.
    pub fn chunks(&self) -> &[Arc<Chunk>] { &self.chunks }

    pub fn get(&self, id: &str) -> Option<&Arc<Chunk>> {
        self.positions.get(id).map(|&i| &self.chunks[i])
    }

    /// Stored IDF; 0 for terms the corpus has never seen.
    pub fn idf(&self, term: &str) -> f32 { self.idf.get(term).copied().unwrap_or(0.0) }

    pub fn postings(&self, term: &str) -> Option<&HashSet<ChunkId>> { self.postings.get(term) }

    /// Number of terms the chunk at `position` tokenized into.
    pub fn doc_len(&self, position: usize) -> usize { self.doc_lens.get(position).copied().unwrap_or(0) }

    pub fn avg_doc_len(&self) -> f32 { self.avg_doc_len }

    pub fn vocabulary_size(&self) -> usize { self.postings.len() }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            chunks: self.chunks.len(),
            terms: self.postings.len(),
            avg_doc_len: self.avg_doc_len,
            embedded_chunks: self.chunks.iter().filter(|c| c.embedding.is_some()).count(),
        }
    }
}

/// `max(0, ln((N - df + 0.5) / (df + 0.5)))`
pub fn bm25_idf(n: f64, df: f64) -> f32 {
    ((n - df + 0.5) / (df + 0.5)).ln().max(0.0) as f32
}
