use crate::DocId;
use std::fmt;
use std::path::PathBuf;

/// Errors raised while building or merging an index.
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    /// The same document ID was produced twice. The corpus must be corrected.
    #[error("duplicate document id {doc_id}")]
    DuplicateDocument { doc_id: DocId },
    /// At least one shard task did not produce a result.
    #[error("{} shard(s) failed: {}", .0.len(), ShardFailure::join(.0))]
    ShardsFailed(Vec<ShardFailure>),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A shard that errored, panicked or missed its deadline.
#[derive(Debug)]
pub struct ShardFailure {
    pub shard: PathBuf,
    pub reason: String,
}

impl ShardFailure {
    fn join(failures: &[ShardFailure]) -> String {
        failures.iter().map(|f| f.to_string()).collect::<Vec<_>>().join("; ")
    }
}

impl fmt::Display for ShardFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.shard.display(), self.reason)
    }
}

/// Rejections of raw query text. None of these consult the index.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("empty query")]
    Empty,
    #[error("unbalanced double quotes")]
    UnbalancedQuotes,
    #[error("empty phrase")]
    EmptyPhrase,
}
