pub mod builder;
pub mod corpus;
pub mod document;
pub mod error;
pub mod index;
pub mod merge;
pub mod persist;
pub mod query;
pub mod scoring;
pub mod shard;
pub mod tokenizer;

pub use error::{IndexError, QueryError, ShardFailure};
pub use index::*;
