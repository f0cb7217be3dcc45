use crate::corpus::{decode_latin1, parse_records};
use crate::document::index_document;
use crate::error::IndexError;
use crate::tokenizer::Normalizer;
use crate::{DocumentIndex, InvertedIndex};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Indexes of every document found in one corpus file.
#[derive(Debug, Clone, PartialEq)]
pub struct Shard {
    pub source: PathBuf,
    pub inverted: InvertedIndex,
    pub documents: DocumentIndex,
    /// Records dropped because they carried no usable ID.
    pub skipped_records: usize,
}

/// Builds one shard per corpus file. Cheap to clone; the normalizer is shared
/// read-only between tasks.
#[derive(Debug, Clone)]
pub struct ShardBuilder {
    normalizer: Arc<Normalizer>,
}

impl ShardBuilder {
    pub fn new(normalizer: Arc<Normalizer>) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &Normalizer { &self.normalizer }

    pub fn build_file(&self, path: &Path) -> Result<Shard, IndexError> {
        let bytes = std::fs::read(path)?;
        self.build_text(path.to_path_buf(), &decode_latin1(&bytes))
    }

    pub fn build_text(&self, source: PathBuf, text: &str) -> Result<Shard, IndexError> {
        let mut inverted = InvertedIndex::new();
        let mut documents = DocumentIndex::new();
        let mut skipped_records = 0;

        for record in parse_records(text) {
            let Some(doc_id) = record.id else {
                skipped_records += 1;
                continue;
            };
            let text = Normalizer::document_text(record.title.unwrap_or(""), record.body.unwrap_or(""));
            let tokens = self.normalizer.normalize(&text);
            index_document(doc_id, &tokens).merge_into(&mut inverted, &mut documents)?;
        }

        if skipped_records > 0 {
            tracing::warn!(shard = %source.display(), skipped_records, "skipped records without a document id");
        }
        tracing::debug!(shard = %source.display(), docs = documents.len(), terms = inverted.len(), "shard built");
        Ok(Shard { source, inverted, documents, skipped_records })
    }
}
