use crate::error::IndexError;
use crate::scoring::tf_weight;
use crate::{DocId, DocumentIndex, InvertedIndex, Position, TermWeights};
use std::collections::{BTreeMap, HashMap};

/// Postings and term weights of a single document.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument {
    pub doc_id: DocId,
    pub postings: BTreeMap<String, Vec<Position>>,
    pub weights: TermWeights,
}

/// Index one normalized token sequence.
///
/// Positions are indices into `tokens`. Empty tokens are never indexed but
/// still consume their slot.
pub fn index_document(doc_id: DocId, tokens: &[String]) -> IndexedDocument {
    let mut postings: BTreeMap<String, Vec<Position>> = BTreeMap::new();
    for (pos, token) in tokens.iter().enumerate() {
        if token.is_empty() {
            continue;
        }
        postings.entry(token.clone()).or_default().push(pos as Position);
    }

    let mut counts: HashMap<&str, u32> = HashMap::new();
    for token in tokens.iter().filter(|t| !t.is_empty()) {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }
    let weights = counts
        .into_iter()
        .map(|(term, count)| (term.to_string(), tf_weight(count)))
        .collect();

    IndexedDocument { doc_id, postings, weights }
}

impl IndexedDocument {
    /// Move this document's postings and weights into shard-level indexes.
    pub fn merge_into(self, inverted: &mut InvertedIndex, documents: &mut DocumentIndex) -> Result<(), IndexError> {
        documents.insert(self.doc_id, self.weights)?;
        for (term, positions) in self.postings {
            inverted.insert(term, self.doc_id, positions)?;
        }
        Ok(())
    }
}
