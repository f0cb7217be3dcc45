//! Query parsing and evaluation against an immutable snapshot.
//!
//! Text wrapped in double quotes is a phrase query; anything else is a
//! free-text query ranked by TF-IDF cosine similarity.

use crate::error::QueryError;
use crate::scoring::{cosine, idf, tf_weight};
use crate::tokenizer::Normalizer;
use crate::{DocId, IndexSnapshot, PostingEntry, Position};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Phrase(Vec<String>),
    FreeText(Vec<String>),
}

impl Query {
    /// Classify raw text and normalize its terms. Quoting errors are caught
    /// here, before the index is consulted.
    pub fn parse(raw: &str, normalizer: &Normalizer) -> Result<Self, QueryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QueryError::Empty);
        }
        let opens = trimmed.starts_with('"');
        let closes = trimmed.ends_with('"');
        if opens != closes || trimmed.matches('"').count() == 1 {
            return Err(QueryError::UnbalancedQuotes);
        }
        if opens {
            let body = &trimmed[1..trimmed.len() - 1];
            if body.trim().is_empty() {
                return Err(QueryError::EmptyPhrase);
            }
            Ok(Query::Phrase(terms(body, normalizer)))
        } else {
            Ok(Query::FreeText(terms(trimmed, normalizer)))
        }
    }

    pub fn terms(&self) -> &[String] {
        match self {
            Query::Phrase(t) | Query::FreeText(t) => t,
        }
    }
}

fn terms(text: &str, normalizer: &Normalizer) -> Vec<String> {
    normalizer.normalize(text).into_iter().filter(|t| !t.is_empty()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResult {
    /// Matching documents, ascending by ID.
    Phrase(Vec<DocId>),
    /// Related documents, best first.
    FreeText(Vec<ScoredDoc>),
}

impl SearchResult {
    pub fn len(&self) -> usize {
        match self {
            SearchResult::Phrase(d) => d.len(),
            SearchResult::FreeText(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Read-only evaluator. Holds no state of its own beyond the snapshot borrow.
#[derive(Debug, Clone, Copy)]
pub struct Searcher<'a> {
    snapshot: &'a IndexSnapshot,
}

impl<'a> Searcher<'a> {
    pub fn new(snapshot: &'a IndexSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn search(&self, query: &Query) -> SearchResult {
        match query {
            Query::Phrase(terms) => SearchResult::Phrase(self.phrase(terms)),
            Query::FreeText(terms) => SearchResult::FreeText(self.free_text(terms)),
        }
    }

    /// Documents containing `terms` at consecutive positions, in order.
    pub fn phrase(&self, terms: &[String]) -> Vec<DocId> {
        let Some(postings) = terms
            .iter()
            .map(|t| self.snapshot.inverted.postings(t))
            .collect::<Option<Vec<&PostingEntry>>>()
        else {
            return Vec::new();
        };
        let Some((first, rest)) = postings.split_first() else {
            return Vec::new();
        };

        first
            .iter()
            .filter_map(|(doc_id, first_positions)| {
                let lists = rest
                    .iter()
                    .map(|p| p.get(doc_id).map(Vec::as_slice))
                    .collect::<Option<Vec<&[Position]>>>()?;
                chain_find(first_positions, &lists).then_some(*doc_id)
            })
            .collect()
    }

    /// Rank every document that contains at least one query term.
    pub fn free_text(&self, terms: &[String]) -> Vec<ScoredDoc> {
        let scorer = FreeTextScorer::new(self.snapshot, terms);
        let mut scored: Vec<ScoredDoc> = scorer
            .related_docs()
            .into_iter()
            .map(|doc_id| ScoredDoc { doc_id, score: scorer.score(doc_id) })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id)));
        scored
    }
}

/// True if some start `p` in `first` has `p + i` in `rest[i - 1]` for every
/// following term.
fn chain_find(first: &[Position], rest: &[&[Position]]) -> bool {
    first.iter().any(|&start| {
        rest.iter().enumerate().all(|(i, positions)| {
            start
                .checked_add(i as Position + 1)
                .is_some_and(|want| positions.binary_search(&want).is_ok())
        })
    })
}

/// TF-IDF vector of one free-text query, scored against document vectors.
pub struct FreeTextScorer<'a> {
    snapshot: &'a IndexSnapshot,
    query_vector: BTreeMap<&'a str, f64>,
    query_terms: Vec<&'a str>,
}

impl<'a> FreeTextScorer<'a> {
    pub fn new(snapshot: &'a IndexSnapshot, terms: &'a [String]) -> Self {
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for term in terms {
            *counts.entry(term.as_str()).or_insert(0) += 1;
        }
        let mut query_terms: Vec<&str> = counts.keys().copied().collect();
        query_terms.sort_unstable();

        let n = snapshot.num_docs();
        let query_vector = counts
            .into_iter()
            .map(|(term, count)| (term, tf_weight(count) * idf(n, snapshot.inverted.doc_frequency(term))))
            .collect();
        Self { snapshot, query_vector, query_terms }
    }

    /// Documents containing at least one query term, ascending.
    pub fn related_docs(&self) -> BTreeSet<DocId> {
        self.query_terms
            .iter()
            .filter_map(|t| self.snapshot.inverted.postings(t))
            .flat_map(|p| p.keys().copied())
            .collect()
    }

    /// Cosine similarity between the query and `doc_id`. Unknown documents and
    /// documents sharing no weighted term with the query score 0.
    pub fn score(&self, doc_id: DocId) -> f64 {
        let Some(weights) = self.snapshot.documents.weights(doc_id) else {
            return 0.0;
        };
        let n = self.snapshot.num_docs();
        let document_vector: BTreeMap<&str, f64> = weights
            .iter()
            .filter(|(_, w)| **w != 0.0)
            .map(|(term, w)| (term.as_str(), w * idf(n, self.snapshot.inverted.doc_frequency(term))))
            .collect();
        cosine(&self.query_vector, &document_vector)
    }
}
