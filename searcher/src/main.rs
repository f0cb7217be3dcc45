use anyhow::Result;
use clap::Parser;
use index_core::persist::{load_snapshot, IndexPaths};
use searcher::{run, Session};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "searcher")]
#[command(about = "Answer phrase and free-text queries against a built index", long_about = None)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: String,
    /// Directory for the timestamped results file
    #[arg(long, default_value = ".")]
    results_dir: String,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let args = Args::parse();
    let snapshot = load_snapshot(&IndexPaths::new(&args.index))?;

    let mut session = Session::new(&snapshot);
    let outcome = run(&mut session, io::stdin().lock(), io::stdout().lock());
    if let Err(e) = &outcome {
        tracing::error!(error = %e, "query session ended early");
    }

    // Results gathered before a failure are still written.
    let path = session.save_results(&PathBuf::from(&args.results_dir), time::OffsetDateTime::now_utc())?;
    println!("Results for {} queries saved to {}", session.results().len(), path.display());
    outcome
}
