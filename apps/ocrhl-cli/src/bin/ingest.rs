use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use std::{env, io};

use indicatif::{ProgressBar, ProgressStyle};
use ocrhl_core::config::Config;
use ocrhl_core::traits::{submit_in_batches, RecordSink};
use ocrhl_core::{ArticleRecord, CorpusWalker, Error};
use ocrhl_solr::SolrClient;
use ocrhl_text::TantivyRecordIndex;

/// Prints records as JSON lines.
struct StdoutSink;

impl RecordSink for StdoutSink {
    fn submit(&self, records: &[ArticleRecord]) -> ocrhl_core::Result<()> {
        let mut out = io::stdout().lock();
        for record in records {
            serde_json::to_writer(&mut out, record).map_err(|e| Error::Io { path: PathBuf::from("<stdout>"), source: e.into() })?;
            writeln!(out).map_err(|e| Error::Io { path: PathBuf::from("<stdout>"), source: e })?;
        }
        Ok(())
    }
}

fn usage() -> ! {
    eprintln!("Usage: ocrhl-ingest [CORPUS_ROOT] [--sink solr|tantivy|stdout] [--batch-size N] [--parallel]");
    std::process::exit(1);
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let mut settings = config.settings()?;
    let args: Vec<String> = env::args().skip(1).collect();
    let mut sink_name = "solr".to_string(); let mut batch_size = settings.solr.batch_size; let mut parallel = false;
    let mut i = 0; while i < args.len() { match args[i].as_str() {
        "--sink" => { match args.get(i + 1) { Some(name) => { sink_name = name.clone(); i += 1; } None => usage() } }
        "--batch-size" => { match args.get(i + 1).and_then(|n| n.parse::<usize>().ok()).filter(|n| *n > 0) { Some(n) => { batch_size = n; i += 1; } None => { eprintln!("Error: --batch-size requires a positive number"); usage() } } }
        "--parallel" | "-p" => parallel = true,
        "--help" | "-h" => usage(),
        arg if !arg.starts_with('-') => settings.ingest.corpus_root = PathBuf::from(arg),
        other => { eprintln!("Error: unknown flag {}", other); usage() } } i += 1; }

    let sink: Box<dyn RecordSink> = match sink_name.as_str() {
        "solr" => { let client = SolrClient::new(&settings.solr)?; println!("Solr endpoint: {}", client.update_url()); Box::new(client) }
        "tantivy" => { let index = TantivyRecordIndex::create(settings.text_index.index_dir.clone())?; println!("Created Tantivy index at: {}", index.index_dir().display()); Box::new(index) }
        "stdout" => Box::new(StdoutSink),
        other => { eprintln!("Error: unknown sink '{}'", other); usage() }
    };
    let quiet = sink_name == "stdout";
    if !quiet { println!("OCR highlight ingest\n===================="); println!("Corpus root: {}", settings.ingest.corpus_root.display()); }

    let walker = CorpusWalker::new(settings.ingest.clone());
    let pb = if quiet { ProgressBar::hidden() } else { ProgressBar::new_spinner() };
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {pos} records {msg}")?);
    if !quiet { pb.enable_steady_tick(Duration::from_millis(120)); }
    tracing::info!(sink = %sink_name, batch_size, parallel, "starting ingest");

    let submitted = if parallel {
        let mut submitted = 0usize; let mut failed = Vec::new();
        for outcome in walker.process_parallel()? {
            match outcome.records {
                Ok(records) => { pb.inc(records.len() as u64); pb.set_message(outcome.issue.issue_id.clone()); submitted += submit_in_batches(sink.as_ref(), records.into_iter().map(Ok), batch_size)?; }
                Err(e) => failed.push(e),
            }
        }
        pb.finish_and_clear();
        for e in &failed { eprintln!("❌ {}", e); }
        if !failed.is_empty() { anyhow::bail!("{} of the issues failed; {} records were submitted", failed.len(), submitted); }
        submitted
    } else {
        let records = walker.walk().inspect(|r| if r.is_ok() { pb.inc(1) });
        let submitted = submit_in_batches(sink.as_ref(), records, batch_size);
        pb.finish_and_clear();
        submitted?
    };

    if !quiet {
        println!("\n✅ Ingest completed successfully!");
        println!("📊 Submitted {} records via {}", submitted, sink_name);
        if sink_name == "tantivy" { println!("\n💡 To search, use: cargo run --bin ocrhl-search '<query>'"); }
    }
    Ok(())
}
