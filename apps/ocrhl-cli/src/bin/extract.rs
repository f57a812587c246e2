use std::env;
use std::path::PathBuf;

use ocrhl_core::config::Config;
use ocrhl_core::Pointer;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <pointer> [corpus_root]", args[0]);
        eprintln!("Example: {} 'issue/text/p1.xml[10:45]+issue/text/p2.xml[5:40]' ./data/bnl_lunion", args[0]);
        std::process::exit(1);
    }
    let settings = Config::load()?.settings()?;
    let pointer: Pointer = args[1].parse()?;
    let root = args.get(2).map(PathBuf::from).unwrap_or(settings.ingest.corpus_root);

    let fragments = pointer.read_fragments(&root, &settings.ingest.pointer_prefix)?;
    let regions = pointer.parts.iter().flat_map(|part| part.regions.iter().map(move |r| (&part.path, r)));
    for ((path, region), fragment) in regions.zip(&fragments) {
        println!("── {} [{}:{}] ({} bytes)", path, region.start, region.end, region.len());
        println!("{}", String::from_utf8_lossy(fragment));
    }
    Ok(())
}
