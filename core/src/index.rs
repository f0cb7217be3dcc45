use crate::error::IndexError;
use crate::tokenizer::NormalizerConfig;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

pub type DocId = u32;
/// 0-based index into a document's normalized token sequence.
pub type Position = u32;

/// document ID -> strictly increasing positions of one term.
pub type PostingEntry = BTreeMap<DocId, Vec<Position>>;
/// term -> 1 + log10(count) for one document.
pub type TermWeights = BTreeMap<String, f64>;

/// term -> PostingEntry.
///
/// Backed by ordered maps so two indexes built from the same corpus compare
/// and serialize identically, whatever order their shards were merged in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    terms: BTreeMap<String, PostingEntry>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub fn postings(&self, term: &str) -> Option<&PostingEntry> {
        self.terms.get(term)
    }

    /// Number of documents whose postings contain `term`; 0 for unknown terms.
    pub fn doc_frequency(&self, term: &str) -> usize {
        self.terms.get(term).map_or(0, |p| p.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PostingEntry)> {
        self.terms.iter()
    }

    /// Record the positions of `term` in `doc_id`.
    ///
    /// Fails if the (term, document) pair is already present: positions are
    /// never concatenated across sources.
    pub fn insert(&mut self, term: String, doc_id: DocId, positions: Vec<Position>) -> Result<(), IndexError> {
        match self.terms.entry(term).or_default().entry(doc_id) {
            Entry::Occupied(_) => Err(IndexError::DuplicateDocument { doc_id }),
            Entry::Vacant(slot) => {
                slot.insert(positions);
                Ok(())
            }
        }
    }

    /// Disjoint union with `other`, per term and document.
    pub fn absorb(&mut self, other: InvertedIndex) -> Result<(), IndexError> {
        for (term, entry) in other.terms {
            match self.terms.entry(term) {
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
                Entry::Occupied(mut slot) => {
                    let existing = slot.get_mut();
                    for (doc_id, positions) in entry {
                        if existing.insert(doc_id, positions).is_some() {
                            return Err(IndexError::DuplicateDocument { doc_id });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// document ID -> term weights. Every indexed document has an entry, even
/// when none of its tokens survived normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentIndex {
    docs: BTreeMap<DocId, TermWeights>,
}

impl DocumentIndex {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn weights(&self, doc_id: DocId) -> Option<&TermWeights> {
        self.docs.get(&doc_id)
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.docs.contains_key(&doc_id)
    }

    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.docs.keys().copied()
    }

    pub fn insert(&mut self, doc_id: DocId, weights: TermWeights) -> Result<(), IndexError> {
        match self.docs.entry(doc_id) {
            Entry::Occupied(_) => Err(IndexError::DuplicateDocument { doc_id }),
            Entry::Vacant(slot) => {
                slot.insert(weights);
                Ok(())
            }
        }
    }

    pub fn absorb(&mut self, other: DocumentIndex) -> Result<(), IndexError> {
        for (doc_id, weights) in other.docs {
            self.insert(doc_id, weights)?;
        }
        Ok(())
    }
}

/// Everything the query side needs to reproduce the build: corpus size and
/// the exact normalization applied to documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
    pub normalizer: NormalizerConfig,
    pub stopwords: Vec<String>,
}

pub const SNAPSHOT_VERSION: u32 = 1;

/// Immutable read-only view used for every query of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSnapshot {
    pub meta: IndexMeta,
    pub inverted: InvertedIndex,
    pub documents: DocumentIndex,
}

impl IndexSnapshot {
    pub fn num_docs(&self) -> u32 { self.meta.num_docs }
}
