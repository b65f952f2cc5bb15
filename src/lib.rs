//! # Jaundice Rate
//!
//! Estimates how sensationalist a news article is: the page is fetched, the
//! article body extracted, the text tokenized and normalized, and the score
//! reported is the percentage of words drawn from a fixed "charged word" set.
//!
//! ## Architecture
//!
//! 1. **Fan-out**: [`orchestrator::Analyzer::process`] spawns one
//!    [`worker::ArticleWorker`] task per URL
//! 2. **Fetching**: each worker downloads its page under `fetch_timeout`
//! 3. **Extracting**: a site rule turns markup into plain text
//!    ([`scrapers`])
//! 4. **Scoring**: [`text::TextScorer`] runs under `analysis_timeout`
//! 5. **Fan-in**: every worker reports exactly one
//!    [`models::ArticleResult`], whatever happened to it
//!
//! Failures are values, not errors: each article ends in one of
//! `OK`, `FETCH_ERROR`, `PARSING_ERROR` or `TIMEOUT`, and one bad URL never
//! affects its siblings.

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod orchestrator;
pub mod outputs;
pub mod scrapers;
pub mod server;
pub mod text;
pub mod utils;
pub mod worker;

pub use error::{Error, Result};
pub use models::{ArticleResult, ProcessingStatus};
pub use orchestrator::Analyzer;
pub use worker::Timeouts;
