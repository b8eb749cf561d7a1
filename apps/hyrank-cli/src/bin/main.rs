use std::env;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use hyrank_core::config::{expand_path, Config, Settings};
use hyrank_core::types::{Chunk, SearchConfig};
use hyrank_hybrid::HybridSearchEngine;

const USAGE: &str = "Usage:
  hyrank query <corpus.json> \"<query>\" [--max N] [--min S] [--semantic W] [--keyword W] [--no-rerank] [--json]
  hyrank stats <corpus.json>";

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() { eprintln!("{}", USAGE); std::process::exit(1); }
    let cmd = args.remove(0);
    (cmd, args)
}

struct QueryArgs {
    corpus: PathBuf,
    query: String,
    config: SearchConfig,
    json: bool,
}

fn parse_query_args(args: &[String], mut config: SearchConfig) -> anyhow::Result<QueryArgs> {
    let mut positional = Vec::new();
    let mut json = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--max" => { config.max_results = flag_value(args, i)?.parse()?; i += 1; }
            "--min" => { config.min_score = flag_value(args, i)?.parse()?; i += 1; }
            "--semantic" => { config.semantic_weight = flag_value(args, i)?.parse()?; i += 1; }
            "--keyword" => { config.keyword_weight = flag_value(args, i)?.parse()?; i += 1; }
            "--no-rerank" => config.rerank = false,
            "--json" => json = true,
            other if other.starts_with("--") => anyhow::bail!("unknown flag {}", other),
            other => positional.push(other.to_string()),
        }
        i += 1;
    }
    if positional.len() != 2 { anyhow::bail!("expected <corpus.json> and \"<query>\"\n{}", USAGE); }
    let query = positional.pop().unwrap_or_default();
    let corpus = expand_path(positional.pop().unwrap_or_default());
    Ok(QueryArgs { corpus, query, config, json })
}

fn flag_value(args: &[String], i: usize) -> anyhow::Result<&str> {
    args.get(i + 1).map(String::as_str).ok_or_else(|| anyhow::anyhow!("{} requires a value", args[i]))
}

fn load_corpus(path: &Path) -> anyhow::Result<Vec<Chunk>> {
    let raw = std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("Failed to read corpus {}: {}", path.display(), e))?;
    let chunks: Vec<Chunk> = serde_json::from_str(&raw).map_err(|e| anyhow::anyhow!("Failed to parse corpus {}: {}", path.display(), e))?;
    Ok(chunks)
}

const INDEX_BATCH: usize = 64;

/// Indexes the corpus in batches through the engine, which embeds chunks
/// that came without a vector under the configured timeout.
async fn index_with_progress(engine: &HybridSearchEngine, mut chunks: Vec<Chunk>) -> anyhow::Result<usize> {
    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")?.progress_chars("#>-"));
    let mut added = 0usize;
    while !chunks.is_empty() {
        let rest = chunks.split_off(chunks.len().min(INDEX_BATCH));
        let batch = std::mem::replace(&mut chunks, rest);
        let len = batch.len() as u64;
        added += engine.index(batch).await;
        pb.inc(len);
    }
    pb.finish_with_message("indexed");
    Ok(added)
}

async fn build_engine(corpus: &Path, settings: &Settings) -> anyhow::Result<HybridSearchEngine> {
    let chunks = load_corpus(corpus)?;
    let engine = HybridSearchEngine::from_settings(settings)?;
    let added = index_with_progress(&engine, chunks).await?;
    tracing::info!(added, corpus = %corpus.display(), "corpus indexed");
    Ok(engine)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let (cmd, args) = parse_args();
    let rt = tokio::runtime::Runtime::new()?;
    match cmd.as_str() {
        "query" => {
            let q = parse_query_args(&args, settings.search.clone())?;
            rt.block_on(async {
                let engine = build_engine(&q.corpus, &settings).await?;
                let outcome = engine.search(&q.query, &q.config).await?;
                if q.json {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                    return Ok::<_, anyhow::Error>(());
                }
                println!("🔍 Found {} results for: \"{}\"", outcome.results.len(), q.query);
                if let Some(reason) = &outcome.degraded_reason { println!("⚠️  Semantic signal unavailable: {}", reason); }
                if let Some(name) = engine.reranker_name().filter(|_| q.config.rerank) { println!("Re-ranked with: {}", name); }
                for (i, r) in outcome.results.iter().enumerate() {
                    println!("\n  {}. score={:.4}  semantic={:.4}  keyword={:.4}  id={}", i + 1, r.hybrid_score, r.semantic_score, r.keyword_score, r.id());
                    println!("     {}", r.explanation);
                    println!("     📝 {}", r.chunk.content);
                }
                Ok(())
            })?;
        }
        "stats" => {
            let corpus = args.first().map(expand_path).unwrap_or_else(|| { eprintln!("{}", USAGE); std::process::exit(1) });
            let stats = rt.block_on(async { Ok::<_, anyhow::Error>(build_engine(&corpus, &settings).await?.stats().await) })?;
            println!("📊 chunks={}  terms={}  avg_doc_len={:.2}  embedded={}", stats.chunks, stats.terms, stats.avg_doc_len, stats.embedded_chunks);
        }
        _ => { eprintln!("Unknown command: {}\n{}", cmd, USAGE); std::process::exit(1); }
    }
    Ok(())
}
