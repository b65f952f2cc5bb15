//! Tokenization and the jaundice score.
//!
//! A text is split on whitespace, every token loses configured punctuation
//! on both ends and is reduced to its base form by a [`Normalizer`]. Tokens
//! of two characters or fewer are dropped (prepositions, particles) unless
//! they are listed as exceptions. The score is the share of kept tokens that
//! belong to the [`ChargedWords`] set, in percent, rounded to two decimals.

use crate::config::AnalyzerConfig;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Maps a surface word form to its canonical base form.
///
/// Shared by every concurrent worker of a run, hence `Send + Sync`.
pub trait Normalizer: Send + Sync {
    fn normal_form(&self, word: &str) -> String;
}

/// Case folding only: lowercases and folds `ё` into `е`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LowercaseNormalizer;

impl Normalizer for LowercaseNormalizer {
    fn normal_form(&self, word: &str) -> String {
        word.to_lowercase().replace('ё', "е")
    }
}

/// Returned when scoring was abandoned because its deadline expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Token counts of one analyzed text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub words_count: usize,
    /// Percentage in `[0.0, 100.0]`, two decimals.
    pub score: f64,
}

pub struct TextScorer {
    normalizer: Arc<dyn Normalizer>,
    punctuation: Vec<char>,
    short_word_exceptions: HashSet<String>,
}

impl std::fmt::Debug for TextScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextScorer")
            .field("punctuation", &self.punctuation.iter().collect::<String>())
            .field("short_word_exceptions", &self.short_word_exceptions)
            .finish()
    }
}

impl TextScorer {
    pub fn new(
        normalizer: Arc<dyn Normalizer>,
        punctuation: &str,
        short_word_exceptions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            normalizer,
            punctuation: punctuation.chars().collect(),
            short_word_exceptions: short_word_exceptions.into_iter().collect(),
        }
    }

    pub fn from_config(normalizer: Arc<dyn Normalizer>, config: &AnalyzerConfig) -> Self {
        Self::new(
            normalizer,
            &config.punctuation,
            config.short_word_exceptions.iter().cloned(),
        )
    }

    /// Split `text` into normalized, filtered words.
    pub fn split_by_words(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .filter_map(|token| self.normalize_token(token))
            .collect()
    }

    /// Like [`split_by_words`](Self::split_by_words), but gives up as soon as
    /// `cancel` fires.
    pub fn split_by_words_until(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<Vec<String>, Cancelled> {
        let mut words = Vec::new();
        for token in text.split_whitespace() {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }
            if let Some(word) = self.normalize_token(token) {
                words.push(word);
            }
        }
        Ok(words)
    }

    /// Score `text` against `charged_words`.
    pub fn score(
        &self,
        text: &str,
        charged_words: &ChargedWords,
        cancel: &CancellationToken,
    ) -> std::result::Result<Score, Cancelled> {
        let words = self.split_by_words_until(text, cancel)?;
        Ok(Score {
            words_count: words.len(),
            score: calculate_jaundice_rate(&words, charged_words),
        })
    }

    fn normalize_token(&self, token: &str) -> Option<String> {
        let cleaned = token.trim_matches(|c: char| self.punctuation.contains(&c));
        if cleaned.is_empty() {
            return None;
        }
        let normalized = self.normalizer.normal_form(cleaned);
        if normalized.chars().count() > 2 || self.short_word_exceptions.contains(&normalized) {
            Some(normalized)
        } else {
            None
        }
    }
}

/// Percentage of `words` found in `charged_words`, rounded to two decimals
/// with ties going to the even digit (3.125 becomes 3.12).
/// An empty word list scores `0.0`.
pub fn calculate_jaundice_rate(words: &[String], charged_words: &ChargedWords) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let charged = words.iter().filter(|w| charged_words.contains(w)).count();
    let score = charged as f64 / words.len() as f64 * 100.0;
    (score * 100.0).round_ties_even() / 100.0
}

/// Immutable set of normalized charged words, shared read-only by a run.
#[derive(Debug, Clone, Default)]
pub struct ChargedWords {
    words: HashSet<String>,
}

impl ChargedWords {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the set from dictionary text, normalizing it like article text.
    pub fn parse(dictionary: &str, scorer: &TextScorer) -> Self {
        Self::from_words(scorer.split_by_words(dictionary))
    }

    /// Read a whitespace-delimited UTF-8 dictionary file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path, scorer: &TextScorer) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::Dictionary {
                path: path.to_path_buf(),
                source,
            })?;
        let words = Self::parse(&raw, scorer);
        info!(count = words.len(), "Loaded charged words");
        Ok(words)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
