use hyrank_core::types::Chunk;
use hyrank_text::index::bm25_idf;
use hyrank_text::LexicalIndex;

fn corpus() -> Vec<Chunk> {
    vec![
        Chunk::new("c1", "apple banana cherry"),
        Chunk::new("c2", "apple apple durian"),
        Chunk::new("c3", "fig grape"),
    ]
}

#[test]
fn postings_hold_every_chunk_containing_a_term() {
    let mut index = LexicalIndex::new();
    assert_eq!(index.add_chunks(corpus()), 3);

    let apple = index.postings("apple").expect("apple indexed");
    assert_eq!(apple.len(), 2);
    assert!(apple.contains("c1") && apple.contains("c2"));
    assert_eq!(index.postings("durian").map(|p| p.len()), Some(1));
    assert!(index.postings("fi").is_none(), "short terms are never indexed");
    assert_eq!(index.vocabulary_size(), 6);
}

#[test]
fn idf_follows_floored_bm25_formula() {
    let mut index = LexicalIndex::new();
    index.add_chunks(corpus());

    let expected = ((3.0f64 - 1.0 + 0.5) / (1.0 + 0.5)).ln() as f32;
    assert!((index.idf("durian") - expected).abs() < 1e-6);
    // df = 2 of 3 gives a negative raw value, stored as 0
    assert_eq!(index.idf("apple"), 0.0);
    assert_eq!(index.idf("unseen"), 0.0);
}

#[test]
fn term_in_every_chunk_has_zero_idf() {
    let mut index = LexicalIndex::new();
    index.add_chunks(vec![
        Chunk::new("a", "common alpha"),
        Chunk::new("b", "common beta"),
        Chunk::new("c", "common gamma"),
        Chunk::new("d", "common delta"),
    ]);
    assert_eq!(index.idf("common"), 0.0);
    assert!(index.idf("alpha") > 0.0);
    assert_eq!(bm25_idf(4.0, 4.0), 0.0);
}

#[test]
fn idf_is_rebuilt_when_chunks_are_added() {
    let mut index = LexicalIndex::new();
    index.add_chunks(corpus());
    let before = index.idf("durian");
    index.add_chunks(vec![Chunk::new("c4", "kiwi lemon"), Chunk::new("c5", "mango melon")]);
    let after = index.idf("durian");
    assert!(after > before, "rarer relative to a bigger corpus: {before} -> {after}");
    assert!((after - bm25_idf(5.0, 1.0)).abs() < 1e-6);
}

#[test]
fn average_document_length_counts_terms() {
    let mut index = LexicalIndex::new();
    assert_eq!(index.avg_doc_len(), 0.0);
    index.add_chunks(corpus());
    assert!((index.avg_doc_len() - 8.0 / 3.0).abs() < 1e-6);
    assert_eq!(index.doc_len(1), 3);
    assert_eq!(index.doc_len(2), 2);
}

#[test]
fn adding_nothing_leaves_the_index_unchanged() {
    let mut index = LexicalIndex::new();
    index.add_chunks(corpus());
    let stats = index.stats();
    let idf = ["apple", "banana", "durian", "grape"].map(|t| index.idf(t));
    let postings = index.postings("apple").cloned();

    assert_eq!(index.add_chunks(Vec::new()), 0);

    assert_eq!(index.stats(), stats);
    assert_eq!(["apple", "banana", "durian", "grape"].map(|t| index.idf(t)), idf);
    assert_eq!(index.postings("apple").cloned(), postings);
}

#[test]
fn duplicate_ids_are_skipped() {
    let mut index = LexicalIndex::new();
    index.add_chunks(corpus());
    let added = index.add_chunks(vec![Chunk::new("c1", "completely different words"), Chunk::new("c9", "new words")]);
    assert_eq!(added, 1);
    assert_eq!(index.len(), 4);
    assert_eq!(index.get("c1").map(|c| c.content.as_str()), Some("apple banana cherry"));
    assert!(index.postings("completely").is_none());
}

#[test]
fn stats_report_sizes() {
    let mut index = LexicalIndex::new();
    assert!(index.is_empty());
    index.add_chunks(vec![
        Chunk::new("v", "vector carrying chunk").with_embedding(vec![1.0, 0.0]),
        Chunk::new("t", "text only chunk"),
    ]);
    let stats = index.stats();
    assert_eq!(stats.chunks, 2);
    assert_eq!(stats.embedded_chunks, 1);
    assert_eq!(stats.terms, 5);
    assert_eq!(index.chunks()[0].id, "v");
}
