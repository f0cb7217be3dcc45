use index_core::builder::{build_index, BuildOptions};
use index_core::persist::{load_snapshot, save_snapshot, IndexPaths};
use index_core::query::{FreeTextScorer, Query, SearchResult, Searcher};
use index_core::scoring::idf;
use index_core::shard::ShardBuilder;
use index_core::tokenizer::{Normalizer, NormalizerConfig, Stopwords};
use index_core::{IndexError, IndexSnapshot};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

const SAMPLE: &str = include_str!("fixtures/reut2-sample.sgm");

fn record(id: u32, title: &str, body: &str) -> String {
    format!("<REUTERS TOPICS=\"NO\" NEWID=\"{id}\">\n<TEXT>\n<TITLE>{title}</TITLE>\n<BODY>{body}</BODY></TEXT>\n</REUTERS>\n")
}

fn write_corpus(dir: &Path, files: &[(&str, String)]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, text)| {
            let path = dir.join(name);
            std::fs::write(&path, text).unwrap();
            path
        })
        .collect()
}

fn builder(stopwords: &str) -> ShardBuilder {
    ShardBuilder::new(Arc::new(Normalizer::new(Stopwords::parse(stopwords), NormalizerConfig::default())))
}

async fn build(files: Vec<PathBuf>, stopwords: &str) -> IndexSnapshot {
    build_index(files, builder(stopwords), BuildOptions::default()).await.unwrap()
}

fn query_normalizer(snapshot: &IndexSnapshot) -> Normalizer {
    Normalizer::new(snapshot.meta.stopwords.iter().collect(), snapshot.meta.normalizer.clone())
}

fn run(snapshot: &IndexSnapshot, raw: &str) -> SearchResult {
    let query = Query::parse(raw, &query_normalizer(snapshot)).unwrap();
    Searcher::new(snapshot).search(&query)
}

#[tokio::test]
async fn phrase_requires_consecutive_order() {
    let dir = tempdir().unwrap();
    let files = write_corpus(dir.path(), &[("one.sgm", record(1, "", "a b c a b"))]);
    let snapshot = build(files, "").await;

    assert_eq!(snapshot.inverted.postings("a").unwrap()[&1], vec![0, 3]);
    assert_eq!(run(&snapshot, "\"a b\""), SearchResult::Phrase(vec![1]));
    assert_eq!(run(&snapshot, "\"b a\""), SearchResult::Phrase(vec![]));
    assert_eq!(run(&snapshot, "\"c a b\""), SearchResult::Phrase(vec![1]));
    assert_eq!(run(&snapshot, "\"a\""), SearchResult::Phrase(vec![1]));
    assert_eq!(run(&snapshot, "\"a zebra\""), SearchResult::Phrase(vec![]));
}

#[tokio::test]
async fn free_text_prefers_documents_with_query_terms() {
    let dir = tempdir().unwrap();
    let files = write_corpus(
        dir.path(),
        &[("a.sgm", record(1, "", "cocoa exports")), ("b.sgm", record(2, "", "grain shipments"))],
    );
    let snapshot = build(files, "").await;
    let terms = vec!["cocoa".to_string(), "exports".to_string()];

    let SearchResult::FreeText(ranked) = run(&snapshot, "cocoa exports") else {
        panic!("expected free-text result");
    };
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].doc_id, 1);

    let scorer = FreeTextScorer::new(&snapshot, &terms);
    assert!((scorer.score(1) - 1.0).abs() < 1e-9);
    assert_eq!(scorer.score(2), 0.0);
    assert!(scorer.score(1) > scorer.score(2));
}

#[tokio::test]
async fn free_text_ranks_by_cosine_then_doc_id() {
    let dir = tempdir().unwrap();
    let files = write_corpus(
        dir.path(),
        &[
            ("a.sgm", record(5, "", "oil oil prices")),
            ("b.sgm", record(3, "", "oil gold silver copper") + &record(4, "", "oil gold silver copper")),
            ("c.sgm", record(7, "", "wheat")),
        ],
    );
    let snapshot = build(files, "").await;
    let SearchResult::FreeText(ranked) = run(&snapshot, "oil prices") else {
        panic!("expected free-text result");
    };
    let ids: Vec<u32> = ranked.iter().map(|d| d.doc_id).collect();
    assert_eq!(ids, vec![5, 3, 4]);
    assert_eq!(ranked[1].score, ranked[2].score);
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn unknown_terms_degrade_to_empty_results() {
    let dir = tempdir().unwrap();
    let files = write_corpus(dir.path(), &[("a.sgm", record(1, "", "cocoa"))]);
    let snapshot = build(files, "").await;
    assert_eq!(run(&snapshot, "zebra"), SearchResult::FreeText(vec![]));
    assert_eq!(run(&snapshot, "\"cocoa zebra\""), SearchResult::Phrase(vec![]));
}

#[tokio::test]
async fn term_in_every_document_keeps_positive_idf() {
    let dir = tempdir().unwrap();
    let files = write_corpus(
        dir.path(),
        &[("a.sgm", record(1, "", "market rose")), ("b.sgm", record(2, "", "market fell"))],
    );
    let snapshot = build(files, "").await;
    assert_eq!(snapshot.num_docs(), 2);
    let df = snapshot.inverted.doc_frequency("market");
    assert_eq!(df, 2);
    assert!(idf(snapshot.num_docs(), df) > 0.0);
    assert_eq!(idf(snapshot.num_docs(), snapshot.inverted.doc_frequency("absent")), 0.0);
}

#[tokio::test]
async fn shard_order_does_not_change_the_index() {
    let dir = tempdir().unwrap();
    let files = write_corpus(
        dir.path(),
        &[
            ("reut2-000.sgm", SAMPLE.to_string()),
            ("reut2-001.sgm", record(10, "Gold", "gold price rose") + &record(11, "", "oil")),
            ("reut2-002.sgm", record(20, "Oil", "standard oil gold")),
        ],
    );
    let forward = build(files.clone(), "the\nof\nto\na").await;
    let mut reversed_files = files.clone();
    reversed_files.reverse();
    let reversed = build(reversed_files, "the\nof\nto\na").await;

    assert_eq!(forward.inverted, reversed.inverted);
    assert_eq!(forward.documents, reversed.documents);
    assert_eq!(forward.num_docs(), 6);
}

#[tokio::test]
async fn duplicate_ids_across_files_fail_the_build() {
    let dir = tempdir().unwrap();
    let files = write_corpus(
        dir.path(),
        &[("a.sgm", record(1, "", "cocoa")), ("b.sgm", record(1, "", "grain"))],
    );
    let err = build_index(files, builder(""), BuildOptions::default()).await.unwrap_err();
    assert!(matches!(err, IndexError::DuplicateDocument { doc_id: 1 }));
}

#[tokio::test]
async fn snapshot_round_trip_preserves_results() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("corpus");
    std::fs::create_dir_all(&corpus).unwrap();
    let files = write_corpus(
        &corpus,
        &[
            ("reut2-000.sgm", SAMPLE.to_string()),
            ("reut2-001.sgm", record(10, "Cocoa prices", "cocoa futures rose in bahia")),
        ],
    );
    let snapshot = build(files, "the\nof\nto\na\nin\nand").await;
    assert_eq!(snapshot.num_docs(), 4);

    let paths = IndexPaths::new(dir.path().join("index"));
    save_snapshot(&paths, &snapshot).unwrap();
    let reloaded = load_snapshot(&paths).unwrap();
    assert_eq!(reloaded, snapshot);

    for raw in ["\"bahia cocoa\"", "\"standard oil\"", "cocoa review", "oil bahia", "\"texas commerce bancshares\""] {
        assert_eq!(run(&snapshot, raw), run(&reloaded, raw), "query {raw}");
    }
    assert_eq!(run(&reloaded, "\"bahia cocoa\""), SearchResult::Phrase(vec![1]));
    assert_eq!(run(&reloaded, "\"standard oil\""), SearchResult::Phrase(vec![2]));
    assert_eq!(run(&reloaded, "\"texas commerce bancshares\""), SearchResult::Phrase(vec![4]));

    let json = std::fs::read_to_string(paths.inverted_index()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["cocoa"]["10"], serde_json::json!([0, 2]));
}
