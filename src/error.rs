//! Setup and startup errors.
//!
//! Per-article failures never show up here: a worker classifies its own
//! outcome into a [`ProcessingStatus`](crate::models::ProcessingStatus).
//! This type covers everything that can stop a run before (or around) the
//! pipeline itself: unreadable dictionaries, bad config files, HTTP client
//! construction and listener binding.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for setup operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The charged-words dictionary could not be read.
    #[error("failed to read charged words from {}: {source}", path.display())]
    Dictionary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The analysis config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The analysis config file is not valid YAML for [`AnalyzerConfig`](crate::config::AnalyzerConfig).
    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A site rule carries a CSS selector that does not parse.
    #[error("invalid selector {selector:?} for host {host}")]
    Selector { host: String, selector: String },

    /// Batch mode was started without any URL to analyze.
    #[error("no article URLs given (pass them as arguments or list them under `urls` in the config)")]
    NoUrls,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
