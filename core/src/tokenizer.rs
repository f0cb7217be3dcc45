use anyhow::{Context, Result};
use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// What happens to tokens that end up empty after punctuation stripping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyTokenPolicy {
    /// Remove them before positions are assigned.
    #[default]
    Drop,
    /// Keep them in the sequence so they occupy a position slot. They are
    /// still never indexed.
    KeepSlot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    #[serde(default)]
    pub empty_tokens: EmptyTokenPolicy,
    #[serde(default)]
    pub stem: bool,
    #[serde(default)]
    pub fold_unicode: bool,
}

/// Lowercase stopword set, loaded once and shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    /// Parse a newline-delimited list. Lines are trimmed and blank lines ignored.
    pub fn parse(text: &str) -> Self {
        text.lines().collect()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading stopwords from {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    pub fn contains(&self, word: &str) -> bool { self.words.contains(word) }

    pub fn len(&self) -> usize { self.words.len() }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }

    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut words: Vec<String> = self.words.iter().cloned().collect();
        words.sort();
        words
    }
}

impl<S: AsRef<str>> FromIterator<S> for Stopwords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let words = iter
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }
}

/// Turns raw document or query text into an ordered token sequence.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    stopwords: Stopwords,
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(stopwords: Stopwords, config: NormalizerConfig) -> Self {
        Self { stopwords, config }
    }

    pub fn config(&self) -> &NormalizerConfig { &self.config }

    pub fn stopwords(&self) -> &Stopwords { &self.stopwords }

    /// Title first, separated from the body by a single space.
    pub fn document_text(title: &str, body: &str) -> String {
        format!("{title} {body}")
    }

    /// Case-fold, flatten newlines, strip whole-word stopwords, strip ASCII
    /// punctuation, split on single spaces and drop stopword or numeric tokens.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let text = if self.config.fold_unicode { fold_diacritics(text) } else { text.to_string() };
        let lowered = text.to_lowercase().replace(['\n', '\r'], " ");

        let without_stopwords = lowered
            .split(' ')
            .filter(|word| !self.stopwords.contains(word))
            .collect::<Vec<_>>()
            .join(" ");

        let stripped: String = without_stopwords
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect();

        stripped
            .split(' ')
            .filter(|token| !self.stopwords.contains(token) && !is_numeric(token))
            .filter(|token| !token.is_empty() || self.config.empty_tokens == EmptyTokenPolicy::KeepSlot)
            .map(|token| {
                if self.config.stem && !token.is_empty() {
                    STEMMER.stem(token).into_owned()
                } else {
                    token.to_string()
                }
            })
            .collect()
    }
}

/// Non-empty and made only of numeric characters.
fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_numeric)
}

fn fold_diacritics(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}
