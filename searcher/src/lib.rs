use anyhow::{Context, Result};
use index_core::query::{Query, SearchResult, Searcher};
use index_core::tokenizer::Normalizer;
use index_core::{IndexSnapshot, QueryError};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::OffsetDateTime;

const PROMPT: &str = "What is your search query? (Press q to quit.) ";

/// What a single input line did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Quit,
    Answered { hits: usize },
    Rejected(QueryError),
}

/// One interactive session over a loaded snapshot. Results are kept in memory,
/// keyed by the query text, until the session ends.
pub struct Session<'a> {
    searcher: Searcher<'a>,
    normalizer: Normalizer,
    results: BTreeMap<String, SearchResult>,
}

impl<'a> Session<'a> {
    /// Queries are normalized with the stopwords and settings the index was built with.
    pub fn new(snapshot: &'a IndexSnapshot) -> Self {
        let normalizer = Normalizer::new(snapshot.meta.stopwords.iter().collect(), snapshot.meta.normalizer.clone());
        Self { searcher: Searcher::new(snapshot), normalizer, results: BTreeMap::new() }
    }

    pub fn handle(&mut self, line: &str) -> Outcome {
        let raw = line.trim();
        if raw.eq_ignore_ascii_case("q") {
            return Outcome::Quit;
        }
        match Query::parse(raw, &self.normalizer) {
            Ok(query) => {
                let result = self.searcher.search(&query);
                let hits = result.len();
                tracing::debug!(query = raw, terms = query.terms().len(), hits, "query evaluated");
                self.results.insert(raw.to_string(), result);
                Outcome::Answered { hits }
            }
            Err(e) => Outcome::Rejected(e),
        }
    }

    pub fn results(&self) -> &BTreeMap<String, SearchResult> { &self.results }

    /// Write every recorded result to `result_<timestamp>.json` in `dir`.
    pub fn save_results(&self, dir: &Path, now: OffsetDateTime) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(results_file_name(now)?);
        let json = serde_json::to_string_pretty(&self.results)?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), queries = self.results.len(), "results written");
        Ok(path)
    }
}

pub fn results_file_name(now: OffsetDateTime) -> Result<String> {
    let stamp = now.format(format_description!("[year]-[month]-[day]T[hour]-[minute]-[second]"))?;
    Ok(format!("result_{stamp}.json"))
}

/// Read queries line by line until `q` or end of input. Lines that are not
/// valid UTF-8 are decoded lossily rather than ending the session.
pub fn run<R: BufRead, W: Write>(session: &mut Session<'_>, mut input: R, mut out: W) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        match session.handle(&line) {
            Outcome::Quit => break,
            Outcome::Answered { hits } => writeln!(out, "{hits} document(s) found; saved for the results file.")?,
            Outcome::Rejected(e) => writeln!(out, "Wrong input ({e}), please try again!")?,
        }
    }
    writeln!(out)?;
    Ok(())
}
