//! Data models for analyzed articles.
//!
//! - [`ProcessingStatus`]: closed outcome taxonomy of one article
//! - [`ArticleResult`]: what a worker produces for one input URL
//! - [`ArticleReport`]: the JSON shape served by the HTTP entry point
//! - [`RunReport`]: a batch run written to disk

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Terminal outcome of one article's pipeline.
///
/// Serialized as `OK`, `FETCH_ERROR`, `PARSING_ERROR` or `TIMEOUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    Ok,
    FetchError,
    ParsingError,
    Timeout,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Ok => "OK",
            ProcessingStatus::FetchError => "FETCH_ERROR",
            ProcessingStatus::ParsingError => "PARSING_ERROR",
            ProcessingStatus::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ways an article can fail. Every variant maps onto one non-`OK` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Fetch,
    Parsing,
    Timeout,
}

impl From<Failure> for ProcessingStatus {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Fetch => ProcessingStatus::FetchError,
            Failure::Parsing => ProcessingStatus::ParsingError,
            Failure::Timeout => ProcessingStatus::Timeout,
        }
    }
}

/// The analysis of one input URL.
///
/// Fields are private so that the only way to build a result is through
/// [`ArticleResult::ok`] or [`ArticleResult::failed`]: a result carries a
/// word count and a score exactly when its status is [`ProcessingStatus::Ok`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleResult {
    url: String,
    status: ProcessingStatus,
    words_count: Option<usize>,
    score: Option<f64>,
    #[serde(serialize_with = "serialize_secs")]
    analysis_duration: Duration,
}

impl ArticleResult {
    pub fn ok(url: impl Into<String>, words_count: usize, score: f64, analysis_duration: Duration) -> Self {
        Self {
            url: url.into(),
            status: ProcessingStatus::Ok,
            words_count: Some(words_count),
            score: Some(score),
            analysis_duration,
        }
    }

    pub fn failed(url: impl Into<String>, failure: Failure) -> Self {
        Self {
            url: url.into(),
            status: failure.into(),
            words_count: None,
            score: None,
            analysis_duration: Duration::ZERO,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    pub fn words_count(&self) -> Option<usize> {
        self.words_count
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    /// Wall-clock time of the scoring phase; zero if scoring never finished.
    pub fn analysis_duration(&self) -> Duration {
        self.analysis_duration
    }
}

impl fmt::Display for ArticleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "URL: {}", self.url)?;
        writeln!(f, "Status: {}", self.status)?;
        match self.score {
            Some(score) => writeln!(f, "Score: {score}")?,
            None => writeln!(f, "Score: None")?,
        }
        match self.words_count {
            Some(count) => write!(f, "Words in article: {count}"),
            None => write!(f, "Words in article: None"),
        }
    }
}

fn serialize_secs<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

/// One entry of the HTTP response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleReport {
    pub status: ProcessingStatus,
    pub url: String,
    pub score: Option<f64>,
    pub words_count: Option<usize>,
}

impl From<&ArticleResult> for ArticleReport {
    fn from(result: &ArticleResult) -> Self {
        Self {
            status: result.status,
            url: result.url.clone(),
            score: result.score,
            words_count: result.words_count,
        }
    }
}

/// A finished batch run, as written by [`outputs::json`](crate::outputs::json).
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// The date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The local time the run finished, `HH:MM:SS`.
    pub local_time: String,
    pub results: Vec<ArticleResult>,
}

impl RunReport {
    /// Stamp `results` with the given local time.
    pub fn new(results: Vec<ArticleResult>, at: DateTime<Local>) -> Self {
        Self {
            local_date: at.format("%Y-%m-%d").to_string(),
            local_time: at.format("%H:%M:%S").to_string(),
            results,
        }
    }
}
