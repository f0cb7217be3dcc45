use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use index_core::builder::{build_index, BuildOptions};
use index_core::persist::{save_snapshot, IndexPaths};
use index_core::shard::ShardBuilder;
use index_core::tokenizer::{EmptyTokenPolicy, Normalizer, NormalizerConfig, Stopwords};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a positional inverted index over a record corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a corpus file or directory, one shard per file
    Build {
        /// Corpus path (file or directory)
        #[arg(long)]
        corpus: String,
        /// Extension of corpus files when walking a directory
        #[arg(long, default_value = "sgm")]
        extension: String,
        /// Newline-delimited stopword list
        #[arg(long)]
        stopwords: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Keep empty tokens as position slots (legacy numbering)
        #[arg(long, default_value_t = false)]
        keep_empty_slots: bool,
        /// Apply English stemming to every token
        #[arg(long, default_value_t = false)]
        stem: bool,
        /// Strip diacritics before case-folding
        #[arg(long, default_value_t = false)]
        fold_unicode: bool,
        /// Fail any shard that takes longer than this many seconds
        #[arg(long)]
        shard_timeout_secs: Option<u64>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { corpus, extension, stopwords, output, keep_empty_slots, stem, fold_unicode, shard_timeout_secs } => {
            let config = NormalizerConfig {
                empty_tokens: if keep_empty_slots { EmptyTokenPolicy::KeepSlot } else { EmptyTokenPolicy::Drop },
                stem,
                fold_unicode,
            };
            let options = BuildOptions { shard_timeout: shard_timeout_secs.map(Duration::from_secs) };
            let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
            let result = rt.block_on(run_build(Path::new(&corpus), &extension, Path::new(&stopwords), Path::new(&output), config, options));
            // A timed-out shard task cannot be cancelled; exit without joining it.
            rt.shutdown_background();
            result
        }
    }
}

async fn run_build(corpus: &Path, extension: &str, stopwords: &Path, output: &Path, config: NormalizerConfig, options: BuildOptions) -> Result<()> {
    let stopwords = Stopwords::from_file(stopwords)?;
    let files = corpus_files(corpus, extension)?;
    if files.is_empty() {
        bail!("no .{} files found under {}", extension, corpus.display());
    }
    tracing::info!(files = files.len(), stopwords = stopwords.len(), "starting index build");

    let builder = ShardBuilder::new(Arc::new(Normalizer::new(stopwords, config)));
    let snapshot = build_index(files, builder, options).await?;

    save_snapshot(&IndexPaths::new(output), &snapshot)?;
    tracing::info!(output = %output.display(), num_docs = snapshot.num_docs(), num_terms = snapshot.inverted.len(), "index written");
    Ok(())
}

/// Corpus files in a stable order: the file itself, or every file with the
/// given extension below a directory. An unreadable entry fails the walk so no
/// shard is left out unnoticed.
fn corpus_files(input: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).follow_links(true) {
            let entry = entry.with_context(|| format!("walking corpus directory {}", input.display()))?;
            let p = entry.path();
            if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some(extension) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files.sort();
    Ok(files)
}
