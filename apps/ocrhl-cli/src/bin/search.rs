use std::env;
use std::path::PathBuf;

use ocrhl_core::config::Config;
use ocrhl_text::RecordSearchEngine;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let mut positional = Vec::new(); let mut limit = 10usize;
    let mut i = 0; while i < args.len() { match args[i].as_str() {
        "--limit" | "-n" => { match args.get(i + 1).and_then(|n| n.parse::<usize>().ok()) { Some(n) => { limit = n; i += 1; } None => { eprintln!("Error: --limit requires a number"); std::process::exit(1); } } }
        _ => positional.push(args[i].clone()) } i += 1; }
    let Some(query_text) = positional.first() else {
        eprintln!("Usage: ocrhl-search <query> [index_dir] [--limit N]");
        eprintln!("Example: ocrhl-search 'title:nouvelles AND author:dupont' ./data/indexes/tantivy");
        std::process::exit(1);
    };
    let index_dir = match positional.get(1) { Some(dir) => PathBuf::from(dir), None => Config::load()?.settings()?.text_index.index_dir };

    println!("🔍 ocrhl-search\n==============");
    println!("Query: {}", query_text); println!("Index directory: {}", index_dir.display());
    let search_engine = RecordSearchEngine::open(index_dir)?;
    let results = search_engine.search(query_text, limit)?;
    println!("\n🔍 Found {} results for: \"{}\"", results.len(), query_text);
    for (i, hit) in results.iter().enumerate() {
        println!("\n  {}. score={:.4}  id={}  date={}", i + 1, hit.score, hit.id, hit.date);
        if !hit.title.is_empty() { println!("     📰 {}", hit.title.join(" / ")); }
        println!("     📍 {}", hit.pointer);
    }
    println!("\n📊 Facet counts:");
    for (source, count) in search_engine.facet_counts(query_text, "/")? {
        println!("  {}: {} records", source, count);
        for (year, count) in search_engine.facet_counts(query_text, &source)? { println!("    {}: {}", year, count); }
    }
    Ok(())
}
