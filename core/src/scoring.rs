//! Weighting and similarity functions shared by the indexer and the query
//! evaluator. All logarithms are base 10.

use std::collections::BTreeMap;

/// Dampened term frequency: `1 + log10(count)`. Only defined for `count >= 1`;
/// a zero count yields 0.
pub fn tf_weight(count: u32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    1.0 + f64::from(count).log10()
}

/// `log10((N + 1) / df)`, or 0 when no document contains the term.
pub fn idf(num_docs: u32, doc_frequency: usize) -> f64 {
    if doc_frequency == 0 {
        return 0.0;
    }
    ((f64::from(num_docs) + 1.0) / doc_frequency as f64).log10()
}

/// Cosine similarity of two sparse vectors. Missing dimensions count as zero
/// and a zero-norm vector scores 0.
pub fn cosine(query: &BTreeMap<&str, f64>, document: &BTreeMap<&str, f64>) -> f64 {
    let dot: f64 = query
        .iter()
        .filter_map(|(term, q)| document.get(*term).map(|d| q * d))
        .sum();
    let norm = euclidean_norm(query.values()) * euclidean_norm(document.values());
    if norm == 0.0 {
        return 0.0;
    }
    dot / norm
}

fn euclidean_norm<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    values.map(|v| v * v).sum::<f64>().sqrt()
}
