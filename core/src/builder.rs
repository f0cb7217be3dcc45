use crate::error::{IndexError, ShardFailure};
use crate::merge::merge_shards;
use crate::shard::{Shard, ShardBuilder};
use crate::{IndexMeta, IndexSnapshot, SNAPSHOT_VERSION};
use std::path::PathBuf;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Deadline for each shard, measured from when its task is spawned.
    pub shard_timeout: Option<Duration>,
}

/// Build one shard per file concurrently, wait for all of them, then merge.
///
/// Every task owns its result and hands it back through its join handle. Any
/// failed shard aborts the build so the index is never silently incomplete.
pub async fn build_index(files: Vec<PathBuf>, builder: ShardBuilder, options: BuildOptions) -> Result<IndexSnapshot, IndexError> {
    let started = Instant::now();
    let deadline = options.shard_timeout.map(|t| started + t);

    let handles: Vec<(PathBuf, JoinHandle<Result<Shard, IndexError>>)> = files
        .into_iter()
        .map(|file| {
            let builder = builder.clone();
            let path = file.clone();
            let handle = tokio::task::spawn_blocking(move || builder.build_file(&path));
            (file, handle)
        })
        .collect();
    tracing::info!(shards = handles.len(), "spawned shard tasks");

    let mut shards = Vec::with_capacity(handles.len());
    let mut failures = Vec::new();
    for (file, handle) in handles {
        let joined = match deadline {
            Some(at) => match tokio::time::timeout_at(at, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    failures.push(ShardFailure { shard: file, reason: "timed out".into() });
                    continue;
                }
            },
            None => handle.await,
        };
        match joined {
            Ok(Ok(shard)) => shards.push(shard),
            Ok(Err(e)) => failures.push(ShardFailure { shard: file, reason: e.to_string() }),
            Err(e) => failures.push(ShardFailure { shard: file, reason: format!("task failed: {e}") }),
        }
    }

    if !failures.is_empty() {
        for f in &failures {
            tracing::error!(shard = %f.shard.display(), reason = %f.reason, "shard failed");
        }
        return Err(IndexError::ShardsFailed(failures));
    }

    let skipped: usize = shards.iter().map(|s| s.skipped_records).sum();
    let merged = merge_shards(shards)?;
    let normalizer = builder.normalizer();
    let meta = IndexMeta {
        num_docs: merged.num_docs(),
        created_at: time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
        version: SNAPSHOT_VERSION,
        normalizer: normalizer.config().clone(),
        stopwords: normalizer.stopwords().to_sorted_vec(),
    };
    tracing::info!(num_docs = meta.num_docs, skipped, elapsed_s = started.elapsed().as_secs_f64(), "index build complete");
    Ok(IndexSnapshot { meta, inverted: merged.inverted, documents: merged.documents })
}
