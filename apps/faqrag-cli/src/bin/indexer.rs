use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use faqrag_core::config::{expand_path, Config};
use faqrag_text::{collect_sources, ChunkParams, Normalizer};
use faqrag_vector::{build_index, BuildOptions};

#[derive(Parser)]
#[command(name = "faqrag-indexer", version, about = "Build the handbook retrieval index")]
struct Cli {
    /// A .pdf/.txt file, or a directory searched recursively for them
    #[arg(default_value = "data/documents")]
    source: String,

    /// Output index directory (defaults to rag.index_dir)
    #[arg(long)]
    out: Option<String>,

    /// Chunk window in characters (defaults to chunking.max_chars)
    #[arg(long)]
    max_chars: Option<usize>,

    /// Chars shared by consecutive chunks (defaults to chunking.overlap)
    #[arg(long)]
    overlap: Option<usize>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    faqrag_cli::init_tracing(cli.verbose);

    let settings = Config::load()?.settings()?;
    let chunking = ChunkParams::new(
        cli.max_chars.unwrap_or(settings.chunking.max_chars),
        cli.overlap.unwrap_or(settings.chunking.overlap),
    )?;
    let options = BuildOptions {
        chunking,
        embedding: settings.embedding.clone(),
        normalizer: Normalizer::new(settings.normalizer.lowercase),
    };

    let source = expand_path(&cli.source);
    let out: PathBuf = expand_path(cli.out.as_deref().unwrap_or(&settings.rag.index_dir));
    let sources = collect_sources(&source)?;
    if sources.is_empty() {
        anyhow::bail!("no .pdf or .txt files found under {}", source.display());
    }

    println!("Handbook Indexer\n================");
    println!("Sources: {} file(s) from {}", sources.len(), source.display());
    println!("Output:  {}", out.display());

    let report = build_index(&sources, &options, &out)
        .with_context(|| format!("building index into {}", out.display()))?;

    println!("\nIndex built.");
    println!("  pages used:    {}", report.pages_used);
    println!("  pages skipped: {} (no text)", report.pages_skipped);
    println!("  chunks:        {}", report.chunks);
    println!("  dimension:     {}", report.dim);
    println!("  embedder:      {}", report.embedder_id);
    Ok(())
}
