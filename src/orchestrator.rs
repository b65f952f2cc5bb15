//! Fan-out / fan-in over a list of URLs.
//!
//! [`Analyzer::process`] spawns one [`ArticleWorker`] task per URL into a
//! `JoinSet`, all at once, and returns only after every task has reported.
//! Workers classify their own outcome, so the set never sees an error other
//! than a panic, which is re-raised. Results come back in completion order.
//!
//! Dropping the `process` future (e.g. an HTTP client hanging up) aborts the
//! remaining tasks and cancels their scoring jobs: no worker outlives the call.

use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ArticleResult, ProcessingStatus};
use crate::scrapers::SiteExtractor;
use crate::text::{ChargedWords, LowercaseNormalizer, Normalizer, TextScorer};
use crate::worker::{ArticleWorker, Timeouts};
use itertools::Itertools;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

/// Collects exactly one result per spawned worker.
///
/// Lives on the orchestrating task only; workers hand their result back
/// through the join set rather than writing into shared state.
#[derive(Debug)]
pub struct ResultAggregator {
    reported: Vec<bool>,
    results: Vec<ArticleResult>,
}

impl ResultAggregator {
    pub fn new(workers: usize) -> Self {
        Self {
            reported: vec![false; workers],
            results: Vec::with_capacity(workers),
        }
    }

    /// Record the result of worker `worker`.
    ///
    /// # Panics
    ///
    /// If `worker` is out of range or has already reported.
    pub fn record(&mut self, worker: usize, result: ArticleResult) {
        assert!(
            !std::mem::replace(&mut self.reported[worker], true),
            "worker {worker} reported twice"
        );
        self.results.push(result);
    }

    pub fn is_complete(&self) -> bool {
        self.results.len() == self.reported.len()
    }

    /// Results in the order they were recorded.
    ///
    /// # Panics
    ///
    /// If a worker has not reported yet.
    pub fn finish(self) -> Vec<ArticleResult> {
        assert!(
            self.is_complete(),
            "{} of {} workers reported",
            self.results.len(),
            self.reported.len()
        );
        self.results
    }
}

/// One analysis setup: the shared client, normalizer, extractor and
/// charged-word set every worker of a run borrows.
#[derive(Debug, Clone)]
pub struct Analyzer {
    worker: ArticleWorker,
}

impl Analyzer {
    pub fn new(worker: ArticleWorker) -> Self {
        Self { worker }
    }

    /// Wire up the default collaborators and load the charged-word dictionary.
    #[instrument(level = "info", skip_all, fields(charged_words_path = %charged_words_path.display()))]
    pub async fn from_config(
        config: &AnalyzerConfig,
        charged_words_path: &Path,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self> {
        let normalizer: Arc<dyn Normalizer> = Arc::new(LowercaseNormalizer);
        let scorer = TextScorer::from_config(normalizer, config);
        let charged_words = ChargedWords::load(charged_words_path, &scorer).await?;
        let extractor = SiteExtractor::new(&config.sites)?;

        Ok(Self::new(ArticleWorker::new(
            fetcher,
            Arc::new(extractor),
            Arc::new(scorer),
            Arc::new(charged_words),
        )))
    }

    /// Analyze every URL concurrently; one result per input, duplicates included.
    #[instrument(level = "info", skip_all, fields(urls = urls.len()))]
    pub async fn process(&self, urls: &[String], timeouts: Timeouts) -> Vec<ArticleResult> {
        let started = Instant::now();
        let run_token = CancellationToken::new();
        let _cancel_on_drop = run_token.clone().drop_guard();

        let mut tasks = JoinSet::new();
        for (index, url) in urls.iter().enumerate() {
            let worker = self.worker.clone();
            let url = url.clone();
            let cancel = run_token.child_token();
            tasks.spawn(async move { (index, worker.run(url, timeouts, cancel).await) });
        }
        info!(
            fetch_timeout_ms = timeouts.fetch.as_millis() as u64,
            analysis_timeout_ms = timeouts.analysis.as_millis() as u64,
            "Spawned article workers"
        );

        let mut aggregator = ResultAggregator::new(urls.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => aggregator.record(index, result),
                Err(join_error) => {
                    error!(error = %join_error, "Article worker died");
                    match join_error.try_into_panic() {
                        Ok(payload) => std::panic::resume_unwind(payload),
                        Err(join_error) => panic!("article worker was cancelled: {join_error}"),
                    }
                }
            }
        }
        let results = aggregator.finish();

        let by_status = results.iter().counts_by(ArticleResult::status);
        info!(
            ok = by_status.get(&ProcessingStatus::Ok).copied().unwrap_or(0),
            fetch_error = by_status.get(&ProcessingStatus::FetchError).copied().unwrap_or(0),
            parsing_error = by_status.get(&ProcessingStatus::ParsingError).copied().unwrap_or(0),
            timeout = by_status.get(&ProcessingStatus::Timeout).copied().unwrap_or(0),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis run complete"
        );
        results
    }
}
