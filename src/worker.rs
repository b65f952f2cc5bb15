//! One article's pipeline.
//!
//! ```text
//! Fetching ──► Extracting ──► Scoring ──► Done(OK)
//!    │             │             │
//!    ├─ non-2xx / transport ─────┼──────► Done(FETCH_ERROR)
//!    ├─ fetch deadline ──────────┼──────► Done(TIMEOUT)
//!    │             └─ not recognized ──► Done(PARSING_ERROR)
//!    │                           └─ analysis deadline ─► Done(TIMEOUT)
//! ```
//!
//! Each phase returns its own `Result` with a [`Failure`]; [`ArticleWorker::run`]
//! turns the first failure into the article's status. Both deadlines collapse
//! into `TIMEOUT`, so the status alone does not tell which phase expired.
//! There are no retries.

use crate::fetch::{FetchError, Fetcher};
use crate::models::{ArticleResult, Failure};
use crate::scrapers::{ExtractError, Extractor};
use crate::text::{Cancelled, ChargedWords, Score, TextScorer};
use crate::utils::truncate_for_log;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Independent deadlines of the network and compute phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub fetch: Duration,
    pub analysis: Duration,
}

impl Timeouts {
    pub const DEFAULT_FETCH: Duration = Duration::from_secs(10);
    pub const DEFAULT_ANALYSIS: Duration = Duration::from_secs(3);

    pub fn new(fetch: Duration, analysis: Duration) -> Self {
        Self { fetch, analysis }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FETCH, Self::DEFAULT_ANALYSIS)
    }
}

/// Everything one article needs, shared with its siblings.
///
/// Cloning is cheap: all collaborators sit behind `Arc`s.
#[derive(Clone)]
pub struct ArticleWorker {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    scorer: Arc<TextScorer>,
    charged_words: Arc<ChargedWords>,
}

impl std::fmt::Debug for ArticleWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleWorker")
            .field("scorer", &self.scorer)
            .field("charged_words", &self.charged_words.len())
            .finish()
    }
}

impl ArticleWorker {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        scorer: Arc<TextScorer>,
        charged_words: Arc<ChargedWords>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            scorer,
            charged_words,
        }
    }

    /// Drive one URL to a terminal status.
    ///
    /// Never fails: every classified outcome becomes an [`ArticleResult`].
    /// A panic inside a collaborator is re-raised rather than classified.
    /// Cancelling `cancel` stops an in-flight scoring job early.
    #[instrument(level = "info", skip(self, url, cancel), fields(%url))]
    pub async fn run(&self, url: String, timeouts: Timeouts, cancel: CancellationToken) -> ArticleResult {
        let outcome = async {
            let html = self.fetch_phase(&url, timeouts.fetch).await?;
            let text = self.extract_phase(&url, &html)?;
            self.score_phase(text, timeouts.analysis, &cancel).await
        }
        .await;

        match outcome {
            Ok((score, elapsed)) => {
                info!(
                    words_count = score.words_count,
                    score = score.score,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Article analyzed"
                );
                ArticleResult::ok(url, score.words_count, score.score, elapsed)
            }
            Err(failure) => {
                let result = ArticleResult::failed(url, failure);
                info!(status = %result.status(), "Article failed");
                result
            }
        }
    }

    async fn fetch_phase(&self, url: &str, deadline: Duration) -> Result<String, Failure> {
        match timeout(deadline, self.fetcher.fetch(url)).await {
            Ok(Ok(html)) => Ok(html),
            Ok(Err(e)) => {
                warn!(error = %e, "Fetch failed");
                Err(classify_fetch(&e))
            }
            Err(_) => {
                warn!(timeout_ms = deadline.as_millis() as u64, "Fetch deadline exceeded");
                Err(Failure::Timeout)
            }
        }
    }

    fn extract_phase(&self, url: &str, html: &str) -> Result<String, Failure> {
        self.extractor.extract(url, html).map_err(|e| {
            warn!(error = %e, "Extraction failed");
            debug!(page = %truncate_for_log(html, 300), "Unrecognized page");
            classify_extract(&e)
        })
    }

    /// Score on the blocking pool; on deadline the job's token is cancelled
    /// so it stops at the next token instead of running to completion.
    async fn score_phase(
        &self,
        text: String,
        deadline: Duration,
        cancel: &CancellationToken,
    ) -> Result<(Score, Duration), Failure> {
        let job_token = cancel.child_token();
        let scorer = Arc::clone(&self.scorer);
        let charged_words = Arc::clone(&self.charged_words);
        let token = job_token.clone();

        let started = Instant::now();
        let job = tokio::task::spawn_blocking(move || scorer.score(&text, &charged_words, &token));

        match timeout(deadline, job).await {
            Ok(Ok(Ok(score))) => Ok((score, started.elapsed())),
            Ok(Ok(Err(Cancelled))) => {
                debug!("Scoring cancelled");
                Err(Failure::Timeout)
            }
            Ok(Err(join_error)) => {
                error!(error = %join_error, "Scoring job did not complete");
                match join_error.try_into_panic() {
                    Ok(payload) => std::panic::resume_unwind(payload),
                    // Blocking jobs are never aborted, so this is a runtime shutdown.
                    Err(_) => Err(Failure::Timeout),
                }
            }
            Err(_) => {
                job_token.cancel();
                warn!(timeout_ms = deadline.as_millis() as u64, "Analysis deadline exceeded");
                Err(Failure::Timeout)
            }
        }
    }
}

/// Every fetch failure is a `FETCH_ERROR`; the variants only differ in logs.
fn classify_fetch(error: &FetchError) -> Failure {
    match error {
        FetchError::Status(_) | FetchError::Transport(_) => Failure::Fetch,
    }
}

fn classify_extract(error: &ExtractError) -> Failure {
    match error {
        ExtractError::NotRecognized => Failure::Parsing,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::{DEFAULT_PUNCTUATION, SiteRule};
    use crate::models::ProcessingStatus;
    use crate::scrapers::SiteExtractor;
    use crate::text::{LowercaseNormalizer, Normalizer};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) const ARTICLE_PAGE: &str = r#"<html><body>
        <div class="layout-article"><p>Обман и ложь, снова обман. Вода вода.</p></div>
        </body></html>"#;

    /// Serves canned responses keyed by URL path, optionally after a delay.
    pub(crate) struct StaticFetcher {
        pub(crate) delay: Duration,
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            tokio::time::sleep(self.delay).await;
            if url.ends_with("/missing.html") {
                return Err(FetchError::Status(StatusCode::NOT_FOUND));
            }
            Ok(ARTICLE_PAGE.to_string())
        }
    }

    /// Lowercases slowly and counts calls.
    struct SlowNormalizer {
        per_word: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl Normalizer for SlowNormalizer {
        fn normal_form(&self, word: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.per_word);
            word.to_lowercase()
        }
    }

    struct PanickingNormalizer;

    impl Normalizer for PanickingNormalizer {
        fn normal_form(&self, _word: &str) -> String {
            panic!("normalizer bug");
        }
    }

    pub(crate) fn worker_with(fetcher: Arc<dyn Fetcher>, normalizer: Arc<dyn Normalizer>) -> ArticleWorker {
        let extractor = SiteExtractor::new(&[SiteRule::inosmi()]).unwrap();
        let scorer = TextScorer::new(normalizer, DEFAULT_PUNCTUATION, ["не".to_string()]);
        ArticleWorker::new(
            fetcher,
            Arc::new(extractor),
            Arc::new(scorer),
            Arc::new(ChargedWords::from_words(["обман", "ложь"])),
        )
    }

    fn worker() -> ArticleWorker {
        worker_with(
            Arc::new(StaticFetcher { delay: Duration::ZERO }),
            Arc::new(LowercaseNormalizer),
        )
    }

    #[tokio::test]
    async fn test_ok_article() {
        let result = worker()
            .run(
                "https://inosmi.ru/ok.html".to_string(),
                Timeouts::default(),
                CancellationToken::new(),
            )
            .await;
        assert_eq!(result.status(), ProcessingStatus::Ok);
        // обман, ложь, снова, обман, вода, вода ("и" is dropped)
        assert_eq!(result.words_count(), Some(6));
        assert_eq!(result.score(), Some(50.0));
    }

    #[tokio::test]
    async fn test_fetch_error() {
        let result = worker()
            .run(
                "https://inosmi.ru/missing.html".to_string(),
                Timeouts::default(),
                CancellationToken::new(),
            )
            .await;
        assert_eq!(result.status(), ProcessingStatus::FetchError);
        assert_eq!(result.words_count(), None);
        assert_eq!(result.score(), None);
    }

    #[tokio::test]
    async fn test_parsing_error() {
        let result = worker()
            .run(
                "https://lenta.ru/brief/2021/08/26/afg_terror/".to_string(),
                Timeouts::default(),
                CancellationToken::new(),
            )
            .await;
        assert_eq!(result.status(), ProcessingStatus::ParsingError);
        assert_eq!(result.words_count(), None);
        assert_eq!(result.score(), None);
        assert_eq!(result.analysis_duration(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let worker = worker_with(
            Arc::new(StaticFetcher { delay: Duration::from_secs(5) }),
            Arc::new(LowercaseNormalizer),
        );
        let timeouts = Timeouts::new(Duration::from_millis(20), Timeouts::DEFAULT_ANALYSIS);
        let result = worker
            .run("https://inosmi.ru/ok.html".to_string(), timeouts, CancellationToken::new())
            .await;
        assert_eq!(result.status(), ProcessingStatus::Timeout);
        assert_eq!(result.words_count(), None);
        assert_eq!(result.score(), None);
    }

    #[tokio::test]
    async fn test_zero_fetch_timeout() {
        let worker = worker_with(
            Arc::new(StaticFetcher { delay: Duration::from_millis(50) }),
            Arc::new(LowercaseNormalizer),
        );
        let timeouts = Timeouts::new(Duration::ZERO, Timeouts::DEFAULT_ANALYSIS);
        let result = worker
            .run("https://inosmi.ru/ok.html".to_string(), timeouts, CancellationToken::new())
            .await;
        assert_eq!(result.status(), ProcessingStatus::Timeout);
    }

    #[tokio::test]
    async fn test_analysis_timeout_cancels_scoring() {
        let calls = Arc::new(AtomicUsize::new(0));
        let normalizer = SlowNormalizer {
            per_word: Duration::from_millis(30),
            calls: Arc::clone(&calls),
        };
        let worker = worker_with(
            Arc::new(StaticFetcher { delay: Duration::ZERO }),
            Arc::new(normalizer),
        );
        let timeouts = Timeouts::new(Timeouts::DEFAULT_FETCH, Duration::from_millis(10));
        let result = worker
            .run("https://inosmi.ru/ok.html".to_string(), timeouts, CancellationToken::new())
            .await;
        assert_eq!(result.status(), ProcessingStatus::Timeout);
        assert_eq!(result.words_count(), None);
        assert_eq!(result.score(), None);

        // The job notices cancellation at the next token and stops.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(calls.load(Ordering::SeqCst) < 7);
    }

    #[tokio::test]
    #[should_panic(expected = "normalizer bug")]
    async fn test_normalizer_panic_is_not_classified() {
        let worker = worker_with(
            Arc::new(StaticFetcher { delay: Duration::ZERO }),
            Arc::new(PanickingNormalizer),
        );
        worker
            .run(
                "https://inosmi.ru/ok.html".to_string(),
                Timeouts::default(),
                CancellationToken::new(),
            )
            .await;
    }
}
